//! The proxy chain a CLI command talks to

use anyhow::{Context, Result};
use gatehouse_backends::{create_connector, SimulatedConnector};
use gatehouse_core::{AuthenticatingProxy, GatehouseConfig, LazyResourceProxy, Resource};
use gatehouse_types::{CacheStats, Command, ConnectionInfo};
use std::sync::Arc;

/// Caching proxy, optionally behind an authenticating proxy
pub struct Session {
    proxy: Arc<LazyResourceProxy>,
    guard: Option<AuthenticatingProxy<Arc<LazyResourceProxy>>>,
    connector: SimulatedConnector,
}

impl Session {
    pub fn open(config: &GatehouseConfig) -> Result<Self> {
        let connector = create_connector(config);
        let proxy = Arc::new(LazyResourceProxy::from_config(
            config,
            Arc::new(connector.clone()),
        ));

        let guard = match &config.auth {
            Some(auth) => Some(
                AuthenticatingProxy::from_config(proxy.clone(), auth)
                    .context("Failed to set up authentication")?,
            ),
            None => None,
        };

        Ok(Self {
            proxy,
            guard,
            connector,
        })
    }

    pub fn requires_login(&self) -> bool {
        self.guard.is_some()
    }

    /// Authenticate against the configured credential
    pub async fn login(&self, username: &str, password: &str) -> Result<bool> {
        let guard = self
            .guard
            .as_ref()
            .context("No auth section configured; nothing to log in to")?;
        Ok(guard.authenticate(username, password).await)
    }

    pub async fn logout(&self) {
        if let Some(guard) = &self.guard {
            guard.logout().await;
        }
    }

    /// Outermost resource of the chain
    fn resource(&self) -> &dyn Resource {
        match &self.guard {
            Some(guard) => guard,
            None => self.proxy.as_ref(),
        }
    }

    pub async fn execute(&self, command: &str) -> gatehouse_core::Result<String> {
        self.resource().execute(&Command::from(command)).await
    }

    pub async fn connection_info(&self) -> ConnectionInfo {
        self.resource().connection_info().await
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.proxy.cache_stats().await
    }

    pub async fn clear_cache(&self) {
        self.proxy.clear_cache().await
    }

    pub fn connect_count(&self) -> usize {
        self.connector.connect_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatehouse_core::AuthConfig;
    use gatehouse_types::Role;

    #[tokio::test]
    async fn test_open_without_auth() {
        let session = Session::open(&GatehouseConfig::default()).unwrap();

        assert!(!session.requires_login());
        assert!(session.login("admin", "x").await.is_err());
        assert_eq!(session.execute("SELECT 1").await.unwrap(), "query returned 100 rows");
        assert_eq!(session.connect_count(), 1);
    }

    #[tokio::test]
    async fn test_open_with_auth() {
        let config = GatehouseConfig {
            auth: Some(AuthConfig::new("user", "user123", Role::User)),
            ..Default::default()
        };
        let session = Session::open(&config).unwrap();

        assert!(session.execute("SELECT 1").await.unwrap_err().is_rejection());
        assert!(session.login("user", "user123").await.unwrap());
        assert!(session.execute("SELECT 1").await.is_ok());

        let info = session.connection_info().await;
        assert_eq!(info.user.as_deref(), Some("user"));
        assert_eq!(info.authenticated, Some(true));
        assert_eq!(info.access_count, Some(1));
    }
}
