use async_trait::async_trait;
use auth::AccessDecision;
use auth::SessionToken;

use crate::domain::identity::errors::DirectoryError;
use crate::domain::identity::errors::GatewayError;
use crate::domain::identity::errors::SessionStoreError;
use crate::domain::identity::models::CredentialRecord;
use crate::domain::identity::models::Identity;
use crate::domain::identity::models::SessionView;

/// Port for gateway operations, composed per request by the HTTP layer.
#[async_trait]
pub trait GatewayServicePort: Send + Sync + 'static {
    /// Verify credentials and open a session for them.
    ///
    /// # Arguments
    /// * `username` - Presented username
    /// * `password` - Presented plaintext password
    ///
    /// # Returns
    /// Token of the new session and the identity bound to it
    ///
    /// # Errors
    /// * `AuthenticationFailed` - Unknown user, disabled account or wrong password
    /// * `Directory` - Directory lookup failed
    /// * `SessionStore` - Session could not be stored
    async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<(SessionToken, Identity), GatewayError>;

    /// Resolve a presented token to the identity bound to it.
    ///
    /// # Returns
    /// Bound identity, or None for unknown and invalidated tokens
    ///
    /// # Errors
    /// * `SessionStore` - Session store lookup failed
    async fn resolve_session(&self, token: &SessionToken)
        -> Result<Option<Identity>, GatewayError>;

    /// Decide whether a caller may perform `method` on `path`.
    ///
    /// Pure in-memory evaluation of the configured rule table.
    fn authorize(&self, method: &str, path: &str, caller: Option<&Identity>) -> AccessDecision;

    /// Describe the caller's session.
    ///
    /// # Errors
    /// * `Unauthenticated` - No identity is bound to the request
    async fn current_session(&self, caller: Option<&Identity>) -> Result<SessionView, GatewayError>;

    /// Invalidate the caller's session, if any.
    ///
    /// # Returns
    /// Whether a live session was removed
    ///
    /// # Errors
    /// * `SessionStore` - Session store operation failed
    async fn logout(&self, token: Option<&SessionToken>) -> Result<bool, GatewayError>;

    /// Check whether a user exists by username or, failing that, by email.
    ///
    /// # Errors
    /// * `BadRequest` - Neither criterion supplied
    /// * `Directory` - Directory lookup failed
    async fn user_exists(
        &self,
        username: Option<String>,
        email: Option<String>,
    ) -> Result<bool, GatewayError>;
}

/// Lookup contract for the user directory.
#[async_trait]
pub trait UserDirectory: Send + Sync + 'static {
    /// Retrieve a record by its primary key.
    ///
    /// # Returns
    /// Optional record (None if not found)
    ///
    /// # Errors
    /// * `Unavailable` - Backend could not be reached
    /// * `InvalidRecord` - Stored row could not be read
    async fn find_by_username(&self, username: &str)
        -> Result<Option<CredentialRecord>, DirectoryError>;

    /// Retrieve a record by email address.
    ///
    /// Emails are not unique at the store layer; the first match is returned.
    ///
    /// # Errors
    /// * `Unavailable` - Backend could not be reached
    /// * `InvalidRecord` - Stored row could not be read
    async fn find_by_email(&self, email: &str) -> Result<Option<CredentialRecord>, DirectoryError>;

    /// Insert or replace a record. Used by seeding only.
    ///
    /// # Errors
    /// * `Unavailable` - Backend could not be reached
    async fn save(&self, record: CredentialRecord) -> Result<(), DirectoryError>;

    /// Remove every record. Used by seeding only.
    ///
    /// # Errors
    /// * `Unavailable` - Backend could not be reached
    async fn delete_all(&self) -> Result<(), DirectoryError>;
}

/// Token to identity bindings.
///
/// Implementations must keep operations on a single token linearizable.
#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
    /// Bind a fresh, never reused token to `identity`.
    ///
    /// # Errors
    /// * `Unavailable` - Backend could not be reached
    async fn create(&self, identity: Identity) -> Result<SessionToken, SessionStoreError>;

    /// Look up the identity bound to `token`.
    ///
    /// # Errors
    /// * `Unavailable` - Backend could not be reached
    async fn resolve(&self, token: &SessionToken) -> Result<Option<Identity>, SessionStoreError>;

    /// Remove the binding for `token`.
    ///
    /// # Returns
    /// Whether a binding existed
    ///
    /// # Errors
    /// * `Unavailable` - Backend could not be reached
    async fn invalidate(&self, token: &SessionToken) -> Result<bool, SessionStoreError>;
}
