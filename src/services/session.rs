use std::sync::Arc;

use tokio::sync::RwLock;

use crate::db::LocalCacheStore;
use crate::error::{AppError, AuthError, Result};
use crate::models::Session;

use super::gateway::RemoteContentGateway;

/// Process-wide auth state: `Anonymous` (no session) or `Authenticated`.
///
/// Owns the persisted token in the local store. Only this component writes
/// session state; the repository merely consults it before mutating calls.
pub struct SessionTokenManager {
    gateway: Option<Arc<RemoteContentGateway>>,
    cache: Arc<LocalCacheStore>,
    state: RwLock<Option<Session>>,
}

impl SessionTokenManager {
    pub fn new(gateway: Option<Arc<RemoteContentGateway>>, cache: Arc<LocalCacheStore>) -> Self {
        Self {
            gateway,
            cache,
            state: RwLock::new(None),
        }
    }

    /// Exchanges credentials for a session. Distinguishes bad credentials
    /// from an unconfirmed account so the caller can message each case.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let Some(gateway) = &self.gateway else {
            return Err(anyhow::anyhow!("remote backend not configured").into());
        };

        match gateway.login(email, password).await {
            Ok(session) => {
                if let Err(e) = self.cache.save_token(&session.access_token).await {
                    tracing::warn!("Failed to persist session token: {}", e);
                }
                *self.state.write().await = Some(session.clone());
                tracing::info!("Logged in as {}", session.user.email);
                Ok(session)
            }
            Err(e) => {
                // A failed login always lands in Anonymous
                *self.state.write().await = None;
                let _ = self.cache.clear_token().await;
                Err(e)
            }
        }
    }

    /// Validates a previously persisted token, once at startup. Any failure
    /// (expired, malformed, network) discards the token so it is never
    /// silently retried on later calls.
    pub async fn restore_session(&self) -> Option<Session> {
        let token = match self.cache.load_token().await {
            Ok(Some(token)) => token,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("Failed to read persisted token: {}", e);
                return None;
            }
        };

        let Some(gateway) = &self.gateway else {
            self.discard_token().await;
            return None;
        };

        match gateway.user_from_token(&token).await {
            Ok(user) => {
                let session = Session {
                    user,
                    access_token: token,
                };
                *self.state.write().await = Some(session.clone());
                tracing::info!("Restored session for {}", session.user.email);
                Some(session)
            }
            Err(e) => {
                tracing::warn!("Stored token rejected, discarding: {}", e);
                self.discard_token().await;
                None
            }
        }
    }

    /// Local-only: drops the session and the persisted token. No remote call.
    pub async fn logout(&self) {
        *self.state.write().await = None;
        self.discard_token().await;
        tracing::info!("Logged out");
    }

    pub async fn current(&self) -> Option<Session> {
        self.state.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.is_some()
    }

    /// Gate for mutating operations: fails before any network call when no
    /// session is active.
    pub async fn require_authenticated(&self) -> Result<Session> {
        self.state
            .read()
            .await
            .clone()
            .ok_or(AppError::Auth(AuthError::NotAuthenticated))
    }

    async fn discard_token(&self) {
        if let Err(e) = self.cache.clear_token().await {
            tracing::warn!("Failed to clear persisted token: {}", e);
        }
    }

    #[cfg(test)]
    pub(crate) async fn install_session(&self, session: Session) {
        *self.state.write().await = Some(session);
    }
}
