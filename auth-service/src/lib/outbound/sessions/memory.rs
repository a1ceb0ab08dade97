use async_trait::async_trait;
use auth::SessionRegistry;
use auth::SessionToken;

use crate::domain::identity::errors::SessionStoreError;
use crate::domain::identity::models::Identity;
use crate::domain::identity::ports::SessionStore;

/// Session store holding bindings in process memory.
///
/// Sessions do not survive a restart.
#[derive(Clone, Default)]
pub struct InMemorySessionStore {
    registry: SessionRegistry<Identity>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn live_sessions(&self) -> usize {
        self.registry.len().await
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(&self, identity: Identity) -> Result<SessionToken, SessionStoreError> {
        Ok(self.registry.create(identity).await)
    }

    async fn resolve(&self, token: &SessionToken) -> Result<Option<Identity>, SessionStoreError> {
        Ok(self.registry.resolve(token).await)
    }

    async fn invalidate(&self, token: &SessionToken) -> Result<bool, SessionStoreError> {
        Ok(self.registry.invalidate(token).await)
    }
}
