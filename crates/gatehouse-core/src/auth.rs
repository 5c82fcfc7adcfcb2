//! Authenticating proxy
//!
//! Wraps any [`Resource`] and refuses to forward commands until a caller has
//! presented the configured credential. Once authenticated, commands that
//! match a privileged keyword additionally require the admin role.

use async_trait::async_trait;
use gatehouse_types::{Command, ConnectionInfo, Identity};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::config::AuthConfig;
use crate::credential::Credential;
use crate::error::{GatehouseError, Result};
use crate::policy::{KeywordMatcher, DEFAULT_PRIVILEGED_KEYWORDS};
use crate::resource::Resource;

#[derive(Debug, Default)]
struct AuthState {
    principal: Option<Identity>,
    failed_attempts: u32,
    locked: bool,
}

pub struct AuthenticatingProxy<R> {
    inner: R,
    credential: Credential,
    privileged: KeywordMatcher,
    lockout_after: Option<u32>,
    state: RwLock<AuthState>,
}

impl<R: Resource> AuthenticatingProxy<R> {
    /// Wrap `inner`, starting unauthenticated, with the default privileged keywords
    pub fn new(inner: R, credential: Credential) -> Self {
        Self {
            inner,
            credential,
            privileged: KeywordMatcher::new(DEFAULT_PRIVILEGED_KEYWORDS),
            lockout_after: None,
            state: RwLock::new(AuthState::default()),
        }
    }

    pub fn from_config(inner: R, config: &AuthConfig) -> Result<Self> {
        let proxy = Self::new(inner, config.credential()?)
            .with_privileged_keywords(KeywordMatcher::new(&config.privileged_keywords));
        Ok(match config.lockout_after {
            Some(attempts) => proxy.with_lockout(attempts),
            None => proxy,
        })
    }

    pub fn with_privileged_keywords(mut self, privileged: KeywordMatcher) -> Self {
        self.privileged = privileged;
        self
    }

    /// Refuse all further logins after `attempts` consecutive failures
    pub fn with_lockout(mut self, attempts: u32) -> Self {
        self.lockout_after = Some(attempts);
        self
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }

    /// Check credentials, replacing any existing session
    ///
    /// A failed attempt always leaves the proxy unauthenticated, even if a
    /// previous attempt had succeeded.
    pub async fn authenticate(&self, username: &str, password: &str) -> bool {
        let mut state = self.state.write().await;

        if state.locked {
            warn!(username, "authentication refused: proxy is locked");
            return false;
        }

        if self.credential.verify(username, password) {
            state.principal = Some(self.credential.identity());
            state.failed_attempts = 0;
            info!(username, role = %self.credential.role(), "authenticated");
            return true;
        }

        state.principal = None;
        state.failed_attempts = state.failed_attempts.saturating_add(1);
        warn!(username, attempts = state.failed_attempts, "authentication failed");

        if let Some(limit) = self.lockout_after {
            if state.failed_attempts >= limit {
                state.locked = true;
                warn!(username, "too many failed attempts, locking proxy");
            }
        }
        false
    }

    /// End the current session, if any
    pub async fn logout(&self) {
        let mut state = self.state.write().await;
        if let Some(principal) = state.principal.take() {
            info!(username = %principal.username, "logged out");
        }
    }

    pub async fn principal(&self) -> Option<Identity> {
        self.state.read().await.principal.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.principal.is_some()
    }

    pub async fn is_locked(&self) -> bool {
        self.state.read().await.locked
    }

    /// Whether `command` needs the admin role
    pub fn is_privileged(&self, command: &Command) -> bool {
        self.privileged.matches(command)
    }
}

#[async_trait]
impl<R: Resource> Resource for AuthenticatingProxy<R> {
    async fn execute(&self, command: &Command) -> Result<String> {
        // Snapshot the principal so the lock is not held while the inner
        // resource runs
        let principal = self
            .state
            .read()
            .await
            .principal
            .clone()
            .ok_or(GatehouseError::AuthRequired)?;

        if !principal.role.is_admin() && self.is_privileged(command) {
            warn!(
                username = %principal.username,
                role = %principal.role,
                command = %command.preview(30),
                "privileged command refused"
            );
            return Err(GatehouseError::AuthorizationDenied {
                role: principal.role,
                command: command.to_string(),
            });
        }

        self.inner.execute(command).await
    }

    async fn connection_info(&self) -> ConnectionInfo {
        let mut info = self.inner.connection_info().await;
        info.user = Some(self.credential.username().to_string());
        info.authenticated = Some(self.is_authenticated().await);
        info
    }
}
