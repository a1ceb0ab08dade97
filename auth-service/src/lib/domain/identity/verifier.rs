use std::sync::Arc;

use auth::PasswordEncoder;

use crate::domain::identity::errors::AuthenticationError;
use crate::domain::identity::models::Identity;
use crate::domain::identity::ports::UserDirectory;

/// Checks presented credentials against the user directory.
///
/// Read-only: nothing in the directory is changed by a verification.
pub struct CredentialVerifier<UD, PE>
where
    UD: UserDirectory,
    PE: PasswordEncoder,
{
    directory: Arc<UD>,
    encoder: Arc<PE>,
}

impl<UD, PE> CredentialVerifier<UD, PE>
where
    UD: UserDirectory,
    PE: PasswordEncoder,
{
    pub fn new(directory: Arc<UD>, encoder: Arc<PE>) -> Self {
        Self { directory, encoder }
    }

    /// Verify a username/password pair.
    ///
    /// Disabled accounts are rejected before the password is looked at.
    ///
    /// # Returns
    /// Identity built from the directory record
    ///
    /// # Errors
    /// * `UnknownPrincipal` - No record for this username
    /// * `AccountDisabled` - Record exists but is inactive
    /// * `InvalidCredentials` - Password does not match the stored hash
    /// * `Directory` - Directory lookup failed
    pub async fn verify(&self, username: &str, password: &str) -> Result<Identity, AuthenticationError> {
        let record = self
            .directory
            .find_by_username(username)
            .await?
            .ok_or_else(|| AuthenticationError::UnknownPrincipal(username.to_string()))?;

        if !record.active {
            return Err(AuthenticationError::AccountDisabled(record.username));
        }

        let matches = self
            .encoder
            .verify(password, &record.password)
            .unwrap_or_else(|e| {
                tracing::warn!(username = %record.username, error = %e, "Stored password hash rejected");
                false
            });

        if !matches {
            return Err(AuthenticationError::InvalidCredentials);
        }

        Ok(record.identity())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use async_trait::async_trait;
    use auth::Argon2PasswordEncoder;
    use mockall::mock;

    use super::*;
    use crate::domain::identity::errors::DirectoryError;
    use crate::domain::identity::models::CredentialRecord;

    mock! {
        pub TestUserDirectory {}

        #[async_trait]
        impl UserDirectory for TestUserDirectory {
            async fn find_by_username(&self, username: &str) -> Result<Option<CredentialRecord>, DirectoryError>;
            async fn find_by_email(&self, email: &str) -> Result<Option<CredentialRecord>, DirectoryError>;
            async fn save(&self, record: CredentialRecord) -> Result<(), DirectoryError>;
            async fn delete_all(&self) -> Result<(), DirectoryError>;
        }
    }

    fn record(username: &str, password: &str, active: bool) -> CredentialRecord {
        CredentialRecord {
            username: username.to_string(),
            password: Argon2PasswordEncoder::new().hash(password).unwrap(),
            email: format!("{}@example.com", username),
            active,
            roles: BTreeSet::from(["USER".to_string()]),
        }
    }

    fn verifier_with(
        directory: MockTestUserDirectory,
    ) -> CredentialVerifier<MockTestUserDirectory, Argon2PasswordEncoder> {
        CredentialVerifier::new(Arc::new(directory), Arc::new(Argon2PasswordEncoder::new()))
    }

    #[tokio::test]
    async fn test_verify_success() {
        let mut directory = MockTestUserDirectory::new();
        let stored = record("alice", "password", true);
        directory
            .expect_find_by_username()
            .withf(|username| username.to_string() == "alice")
            .times(1)
            .returning(move |_| Ok(Some(stored.clone())));

        let identity = verifier_with(directory)
            .verify("alice", "password")
            .await
            .expect("verification should succeed");

        assert_eq!(identity.username, "alice");
        assert!(identity.has_role("USER"));
    }

    #[tokio::test]
    async fn test_verify_unknown_principal() {
        let mut directory = MockTestUserDirectory::new();
        directory
            .expect_find_by_username()
            .times(1)
            .returning(|_| Ok(None));

        let result = verifier_with(directory).verify("ghost", "password").await;
        assert!(matches!(
            result,
            Err(AuthenticationError::UnknownPrincipal(name)) if name == "ghost"
        ));
    }

    #[tokio::test]
    async fn test_verify_wrong_password() {
        let mut directory = MockTestUserDirectory::new();
        let stored = record("alice", "password", true);
        directory
            .expect_find_by_username()
            .returning(move |_| Ok(Some(stored.clone())));

        let result = verifier_with(directory).verify("alice", "guess").await;
        assert!(matches!(result, Err(AuthenticationError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_disabled_account_never_verifies() {
        let mut directory = MockTestUserDirectory::new();
        let stored = record("frozen", "password", false);
        directory
            .expect_find_by_username()
            .times(2)
            .returning(move |_| Ok(Some(stored.clone())));

        let verifier = verifier_with(directory);

        let correct = verifier.verify("frozen", "password").await;
        assert!(matches!(correct, Err(AuthenticationError::AccountDisabled(_))));

        let wrong = verifier.verify("frozen", "guess").await;
        assert!(matches!(wrong, Err(AuthenticationError::AccountDisabled(_))));
    }

    #[tokio::test]
    async fn test_malformed_stored_hash_is_invalid_credentials() {
        let mut directory = MockTestUserDirectory::new();
        directory.expect_find_by_username().returning(|_| {
            Ok(Some(CredentialRecord {
                username: "legacy".into(),
                password: "{noop}password".into(),
                email: "legacy@example.com".into(),
                active: true,
                roles: BTreeSet::new(),
            }))
        });

        let result = verifier_with(directory).verify("legacy", "password").await;
        assert!(matches!(result, Err(AuthenticationError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_directory_failure_propagates() {
        let mut directory = MockTestUserDirectory::new();
        directory
            .expect_find_by_username()
            .returning(|_| Err(DirectoryError::Unavailable("connection refused".into())));

        let result = verifier_with(directory).verify("alice", "password").await;
        assert!(matches!(
            result,
            Err(AuthenticationError::Directory(DirectoryError::Unavailable(_)))
        ));
    }
}
