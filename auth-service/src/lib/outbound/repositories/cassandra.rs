use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use scylla::QueryResult;
use scylla::Session;
use scylla::SessionBuilder;

use crate::config::CassandraConfig;
use crate::domain::identity::errors::DirectoryError;
use crate::domain::identity::models::CredentialRecord;
use crate::domain::identity::ports::UserDirectory;

type UserRow = (
    String,
    Option<String>,
    Option<String>,
    Option<bool>,
    Option<BTreeSet<String>>,
);

/// User directory backed by a Cassandra `users` table keyed by username.
pub struct CassandraUserDirectory {
    session: Arc<Session>,
}

impl CassandraUserDirectory {
    pub async fn new(config: &CassandraConfig) -> Result<Self, anyhow::Error> {
        let session = SessionBuilder::new()
            .known_nodes(&config.nodes)
            .build()
            .await?;

        session
            .query(
                format!(
                    "CREATE KEYSPACE IF NOT EXISTS {}
                    WITH REPLICATION = {{
                        'class': 'SimpleStrategy',
                        'replication_factor': 1
                    }}",
                    &config.keyspace
                ),
                &[],
            )
            .await?;

        session.use_keyspace(&config.keyspace, false).await?;

        session
            .query(
                "CREATE TABLE IF NOT EXISTS users (
                    username text PRIMARY KEY,
                    password text,
                    email text,
                    active boolean,
                    roles set<text>
                )",
                &[],
            )
            .await?;

        tracing::info!(
            keyspace = %config.keyspace,
            nodes = ?config.nodes,
            "Cassandra user directory ready"
        );

        Ok(Self {
            session: Arc::new(session),
        })
    }

    fn first_record(result: QueryResult) -> Result<Option<CredentialRecord>, DirectoryError> {
        let Some(row) = result.rows.and_then(|rows| rows.into_iter().next()) else {
            return Ok(None);
        };

        let (username, password, email, active, roles) = row
            .into_typed::<UserRow>()
            .map_err(|e| DirectoryError::InvalidRecord(e.to_string()))?;

        let password = password.ok_or_else(|| {
            DirectoryError::InvalidRecord(format!("user {} has no password", username))
        })?;

        Ok(Some(CredentialRecord {
            username,
            password,
            email: email.unwrap_or_default(),
            active: active.unwrap_or(false),
            roles: roles.unwrap_or_default(),
        }))
    }
}

#[async_trait]
impl UserDirectory for CassandraUserDirectory {
    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<CredentialRecord>, DirectoryError> {
        let result = self
            .session
            .query(
                "SELECT username, password, email, active, roles
                 FROM users
                 WHERE username = ?",
                (username,),
            )
            .await
            .map_err(|e| DirectoryError::Unavailable(e.to_string()))?;

        Self::first_record(result)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<CredentialRecord>, DirectoryError> {
        // email is not part of the key
        let result = self
            .session
            .query(
                "SELECT username, password, email, active, roles
                 FROM users
                 WHERE email = ?
                 LIMIT 1
                 ALLOW FILTERING",
                (email,),
            )
            .await
            .map_err(|e| DirectoryError::Unavailable(e.to_string()))?;

        Self::first_record(result)
    }

    async fn save(&self, record: CredentialRecord) -> Result<(), DirectoryError> {
        self.session
            .query(
                "INSERT INTO users (username, password, email, active, roles)
                 VALUES (?, ?, ?, ?, ?)",
                (
                    record.username.as_str(),
                    record.password.as_str(),
                    record.email.as_str(),
                    record.active,
                    &record.roles,
                ),
            )
            .await
            .map_err(|e| DirectoryError::Unavailable(e.to_string()))?;

        Ok(())
    }

    async fn delete_all(&self) -> Result<(), DirectoryError> {
        self.session
            .query("TRUNCATE users", &[])
            .await
            .map_err(|e| DirectoryError::Unavailable(e.to_string()))?;

        Ok(())
    }
}
