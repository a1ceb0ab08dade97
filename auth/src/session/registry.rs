use std::collections::HashMap;
use std::sync::Arc;

use chrono::DateTime;
use chrono::Utc;
use tokio::sync::RwLock;

use super::token::SessionToken;

/// A live binding from a token to whatever the owning service authenticates.
#[derive(Debug)]
struct Session<T> {
    principal: T,
    created_at: DateTime<Utc>,
}

/// In-process session registry.
///
/// Every operation takes the lock exactly once, so operations on the same
/// token are linearizable: a `resolve` racing an `invalidate` observes either
/// the old binding or nothing.
#[derive(Debug)]
pub struct SessionRegistry<T> {
    sessions: Arc<RwLock<HashMap<SessionToken, Session<T>>>>,
}

impl<T> Clone for SessionRegistry<T> {
    fn clone(&self) -> Self {
        Self {
            sessions: Arc::clone(&self.sessions),
        }
    }
}

impl<T> SessionRegistry<T>
where
    T: Clone + Send + Sync,
{
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Bind a freshly generated token to `principal`.
    ///
    /// The collision check and the insert happen under the same write guard,
    /// so a live token is never handed out twice.
    pub async fn create(&self, principal: T) -> SessionToken {
        let mut sessions = self.sessions.write().await;

        let token = loop {
            let candidate = SessionToken::generate();
            if !sessions.contains_key(&candidate) {
                break candidate;
            }
            tracing::warn!("Generated session token collided with a live session, retrying");
        };

        sessions.insert(
            token.clone(),
            Session {
                principal,
                created_at: Utc::now(),
            },
        );

        tracing::debug!(live_sessions = sessions.len(), "Session created");
        token
    }

    /// Look up the principal bound to `token`.
    pub async fn resolve(&self, token: &SessionToken) -> Option<T> {
        self.sessions
            .read()
            .await
            .get(token)
            .map(|session| session.principal.clone())
    }

    /// Remove the binding for `token`.
    ///
    /// # Returns
    /// Whether a binding existed. Unknown or already invalidated tokens report false.
    pub async fn invalidate(&self, token: &SessionToken) -> bool {
        match self.sessions.write().await.remove(token) {
            Some(session) => {
                let lifetime = Utc::now() - session.created_at;
                tracing::debug!(
                    lifetime_secs = lifetime.num_seconds(),
                    "Session invalidated"
                );
                true
            }
            None => false,
        }
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

impl<T> Default for SessionRegistry<T>
where
    T: Clone + Send + Sync,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_then_resolve() {
        let registry = SessionRegistry::new();
        let token = registry.create("alice".to_string()).await;

        assert_eq!(registry.resolve(&token).await, Some("alice".to_string()));
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_resolve_unknown_token() {
        let registry: SessionRegistry<String> = SessionRegistry::new();
        assert_eq!(registry.resolve(&SessionToken::new("unknown")).await, None);
    }

    #[tokio::test]
    async fn test_invalidate_twice() {
        let registry = SessionRegistry::new();
        let token = registry.create("alice".to_string()).await;

        assert!(registry.invalidate(&token).await);
        assert!(!registry.invalidate(&token).await);
        assert_eq!(registry.resolve(&token).await, None);
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_sessions_are_independent() {
        let registry = SessionRegistry::new();
        let first = registry.create("alice".to_string()).await;
        let second = registry.create("alice".to_string()).await;

        assert_ne!(first, second);

        registry.invalidate(&first).await;
        assert_eq!(registry.resolve(&second).await, Some("alice".to_string()));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_sessions_do_not_interfere() {
        let registry: SessionRegistry<String> = SessionRegistry::new();

        let mut handles = Vec::new();
        for i in 0..64 {
            let registry = registry.clone();
            handles.push(tokio::spawn(async move {
                let name = format!("user{}", i);
                let token = registry.create(name.clone()).await;
                assert_eq!(registry.resolve(&token).await, Some(name));
                if i % 2 == 0 {
                    assert!(registry.invalidate(&token).await);
                    assert_eq!(registry.resolve(&token).await, None);
                }
            }));
        }

        for handle in handles {
            handle.await.expect("task panicked");
        }

        assert_eq!(registry.len().await, 32);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_invalidate_reports_true_once() {
        let registry: SessionRegistry<String> = SessionRegistry::new();
        let token = registry.create("alice".to_string()).await;

        let mut handles = Vec::new();
        for _ in 0..16 {
            let registry = registry.clone();
            let token = token.clone();
            handles.push(tokio::spawn(
                async move { registry.invalidate(&token).await },
            ));
        }

        let mut removed = 0;
        for handle in handles {
            if handle.await.expect("task panicked") {
                removed += 1;
            }
        }

        assert_eq!(removed, 1);
    }
}
