use std::sync::Arc;

use async_trait::async_trait;
use auth::AccessDecision;
use auth::AccessPolicy;
use auth::PasswordEncoder;
use auth::SessionToken;

use crate::domain::identity::errors::GatewayError;
use crate::domain::identity::models::ExistenceQuery;
use crate::domain::identity::models::Identity;
use crate::domain::identity::models::SessionView;
use crate::domain::identity::ports::GatewayServicePort;
use crate::domain::identity::ports::SessionStore;
use crate::domain::identity::ports::UserDirectory;
use crate::domain::identity::verifier::CredentialVerifier;

/// Message returned when the existence check gets no criterion.
pub const EXISTENCE_CRITERION_REQUIRED: &str = "request param username or email is required.";

/// Gateway facade.
///
/// Concrete implementation of GatewayServicePort composing the credential
/// verifier, the session store and the access policy.
pub struct GatewayService<UD, SS, PE>
where
    UD: UserDirectory,
    SS: SessionStore,
    PE: PasswordEncoder,
{
    directory: Arc<UD>,
    sessions: Arc<SS>,
    verifier: CredentialVerifier<UD, PE>,
    policy: AccessPolicy,
}

impl<UD, SS, PE> GatewayService<UD, SS, PE>
where
    UD: UserDirectory,
    SS: SessionStore,
    PE: PasswordEncoder,
{
    /// Create a new gateway service with injected dependencies.
    ///
    /// # Arguments
    /// * `directory` - User directory lookups
    /// * `sessions` - Session store
    /// * `encoder` - Password hash verification
    /// * `policy` - Ordered access rules, fixed for the lifetime of the service
    pub fn new(directory: Arc<UD>, sessions: Arc<SS>, encoder: Arc<PE>, policy: AccessPolicy) -> Self {
        Self {
            verifier: CredentialVerifier::new(Arc::clone(&directory), encoder),
            directory,
            sessions,
            policy,
        }
    }
}

#[async_trait]
impl<UD, SS, PE> GatewayServicePort for GatewayService<UD, SS, PE>
where
    UD: UserDirectory,
    SS: SessionStore,
    PE: PasswordEncoder,
{
    async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<(SessionToken, Identity), GatewayError> {
        let identity = self.verifier.verify(username, password).await.map_err(|e| {
            tracing::warn!(username = %username, reason = %e, "Authentication failed");
            GatewayError::from(e)
        })?;

        let token = self.sessions.create(identity.clone()).await?;
        tracing::info!(username = %identity.username, "Session opened");

        Ok((token, identity))
    }

    async fn resolve_session(
        &self,
        token: &SessionToken,
    ) -> Result<Option<Identity>, GatewayError> {
        Ok(self.sessions.resolve(token).await?)
    }

    fn authorize(&self, method: &str, path: &str, caller: Option<&Identity>) -> AccessDecision {
        let decision = self.policy.decide(method, path, caller);
        if let AccessDecision::Denied(reason) = decision {
            tracing::debug!(
                %method,
                %path,
                caller = caller.map(|c| c.username.as_str()).unwrap_or("anonymous"),
                ?reason,
                "Access denied"
            );
        }
        decision
    }

    async fn current_session(&self, caller: Option<&Identity>) -> Result<SessionView, GatewayError> {
        caller
            .map(SessionView::from)
            .ok_or(GatewayError::Unauthenticated)
    }

    async fn logout(&self, token: Option<&SessionToken>) -> Result<bool, GatewayError> {
        let Some(token) = token else {
            return Ok(false);
        };

        let removed = self.sessions.invalidate(token).await?;
        if removed {
            tracing::info!("Session closed");
        }
        Ok(removed)
    }

    async fn user_exists(
        &self,
        username: Option<String>,
        email: Option<String>,
    ) -> Result<bool, GatewayError> {
        let query = ExistenceQuery::from_params(username, email)
            .ok_or_else(|| GatewayError::BadRequest(EXISTENCE_CRITERION_REQUIRED.to_string()))?;

        let record = match &query {
            ExistenceQuery::Username(username) => self.directory.find_by_username(username).await?,
            ExistenceQuery::Email(email) => self.directory.find_by_email(email).await?,
        };

        Ok(record.is_some())
    }
}
