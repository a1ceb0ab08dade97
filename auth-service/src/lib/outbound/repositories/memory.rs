use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::identity::errors::DirectoryError;
use crate::domain::identity::models::CredentialRecord;
use crate::domain::identity::ports::UserDirectory;

/// Process-local user directory.
///
/// Records are kept ordered by username so email lookups return the same
/// first match on every call.
#[derive(Clone, Default)]
pub struct InMemoryUserDirectory {
    records: Arc<RwLock<BTreeMap<String, CredentialRecord>>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: impl IntoIterator<Item = CredentialRecord>) -> Self {
        let records = records
            .into_iter()
            .map(|record| (record.username.clone(), record))
            .collect();

        Self {
            records: Arc::new(RwLock::new(records)),
        }
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<CredentialRecord>, DirectoryError> {
        Ok(self.records.read().await.get(username).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<CredentialRecord>, DirectoryError> {
        Ok(self
            .records
            .read()
            .await
            .values()
            .find(|record| record.email == email)
            .cloned())
    }

    async fn save(&self, record: CredentialRecord) -> Result<(), DirectoryError> {
        self.records
            .write()
            .await
            .insert(record.username.clone(), record);
        Ok(())
    }

    async fn delete_all(&self) -> Result<(), DirectoryError> {
        self.records.write().await.clear();
        Ok(())
    }
}
