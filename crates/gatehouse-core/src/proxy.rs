//! Lazy caching proxy
//!
//! [`LazyResourceProxy`] stands in front of an expensive backend. It defers
//! constructing the backend until a command actually needs it, answers
//! repeated commands from a bounded FIFO cache, and refuses commands that
//! the configured [`AccessPolicy`] denies.
//!
//! All mutable state (backend handle, cache, access counter) sits behind a
//! single async mutex held for the whole of `execute`. That gives two
//! guarantees under concurrent callers: the backend is connected at most
//! once, and each lookup/store/evict sequence is applied atomically.

use std::sync::Arc;

use async_trait::async_trait;
use gatehouse_types::{CacheStats, Command, ConnectionInfo, Endpoint};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::cache::{BoundedCache, DEFAULT_CACHE_CAPACITY};
use crate::config::GatehouseConfig;
use crate::error::Result;
use crate::policy::AccessPolicy;
use crate::resource::{Connector, Resource};

/// Characters of an evicted command shown in logs
const EVICTION_PREVIEW_CHARS: usize = 30;

struct ProxyState {
    backend: Option<Arc<dyn Resource>>,
    cache: BoundedCache<Command, String>,
    access_count: u64,
}

pub struct LazyResourceProxy {
    endpoint: Endpoint,
    connector: Arc<dyn Connector>,
    policy: AccessPolicy,
    state: Mutex<ProxyState>,
}

impl LazyResourceProxy {
    /// Create a proxy with the default cache capacity and access policy
    ///
    /// Nothing is connected here; `connector` is only invoked on the first
    /// allowed, uncached command.
    pub fn new(endpoint: Endpoint, connector: Arc<dyn Connector>) -> Self {
        Self {
            endpoint,
            connector,
            policy: AccessPolicy::default(),
            state: Mutex::new(ProxyState {
                backend: None,
                cache: BoundedCache::new(DEFAULT_CACHE_CAPACITY),
                access_count: 0,
            }),
        }
    }

    /// Create a proxy from the backend, cache and access sections of `config`
    pub fn from_config(config: &GatehouseConfig, connector: Arc<dyn Connector>) -> Self {
        Self::new(config.backend.endpoint(), connector)
            .with_cache_capacity(config.cache.capacity)
            .with_access_policy(AccessPolicy::new(&config.access.restricted_keywords))
    }

    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.state.get_mut().cache = BoundedCache::new(capacity);
        self
    }

    pub fn with_access_policy(mut self, policy: AccessPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Whether the backend has been constructed yet
    pub async fn is_initialized(&self) -> bool {
        self.state.lock().await.backend.is_some()
    }

    /// Drop every cached result; the backend and access count are untouched
    pub async fn clear_cache(&self) {
        let mut state = self.state.lock().await;
        state.cache.clear();
        info!("cache cleared");
    }

    pub async fn cache_stats(&self) -> CacheStats {
        let state = self.state.lock().await;
        CacheStats {
            cached_commands: state.cache.keys(),
            cache_size: state.cache.len(),
            access_count: state.access_count,
        }
    }

    pub async fn access_count(&self) -> u64 {
        self.state.lock().await.access_count
    }

    async fn backend(&self, state: &mut ProxyState) -> Result<Arc<dyn Resource>> {
        if let Some(backend) = &state.backend {
            return Ok(backend.clone());
        }

        info!(endpoint = %self.endpoint, "connecting to backend");
        let backend = self.connector.connect(&self.endpoint).await?;
        info!(endpoint = %self.endpoint, "backend connection established");

        state.backend = Some(backend.clone());
        Ok(backend)
    }
}

#[async_trait]
impl Resource for LazyResourceProxy {
    async fn execute(&self, command: &Command) -> Result<String> {
        let mut state = self.state.lock().await;
        state.access_count += 1;
        debug!(request = state.access_count, command = %command.preview(60), "executing");

        // Denied commands never touch the cache or the backend
        self.policy.check(command).into_result()?;

        if let Some(cached) = state.cache.get(command) {
            debug!(command = %command.preview(60), "serving cached result");
            return Ok(cached.clone());
        }

        let backend = self.backend(&mut state).await?;
        let result = backend.execute(command).await?;

        if let Some(evicted) = state.cache.put(command.clone(), result.clone()) {
            debug!(evicted = %evicted.preview(EVICTION_PREVIEW_CHARS), "evicted from cache");
        }
        debug!(cache_size = state.cache.len(), "result cached");

        Ok(result)
    }

    async fn connection_info(&self) -> ConnectionInfo {
        let state = self.state.lock().await;
        let mut info = match &state.backend {
            Some(backend) => backend.connection_info().await,
            None => ConnectionInfo::not_initialized(&self.endpoint),
        };
        info.cache_size = Some(state.cache.len());
        info.access_count = Some(state.access_count);
        info
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GatehouseError;
    use gatehouse_types::ConnectionStatus;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Backend that echoes commands and counts executions
    struct EchoBackend {
        endpoint: Endpoint,
        executions: Arc<AtomicUsize>,
        fail_on: Option<&'static str>,
    }

    #[async_trait]
    impl Resource for EchoBackend {
        async fn execute(&self, command: &Command) -> Result<String> {
            self.executions.fetch_add(1, Ordering::SeqCst);
            if let Some(marker) = self.fail_on {
                if command.as_str().contains(marker) {
                    return Err(GatehouseError::BackendExec("syntax error".to_string()));
                }
            }
            Ok(format!("result of {}", command))
        }

        async fn connection_info(&self) -> ConnectionInfo {
            ConnectionInfo::new(&self.endpoint, ConnectionStatus::Connected)
        }
    }

    #[derive(Default)]
    struct CountingConnector {
        connects: Arc<AtomicUsize>,
        executions: Arc<AtomicUsize>,
        fail_on: Option<&'static str>,
        refuse: bool,
        delay: Option<Duration>,
    }

    #[async_trait]
    impl Connector for CountingConnector {
        async fn connect(&self, endpoint: &Endpoint) -> Result<Arc<dyn Resource>> {
            self.connects.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.refuse {
                return Err(GatehouseError::BackendConnect("connection refused".to_string()));
            }
            Ok(Arc::new(EchoBackend {
                endpoint: endpoint.clone(),
                executions: self.executions.clone(),
                fail_on: self.fail_on,
            }))
        }
    }

    fn proxy_with(connector: CountingConnector) -> (LazyResourceProxy, Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let connects = connector.connects.clone();
        let executions = connector.executions.clone();
        let proxy = LazyResourceProxy::new(Endpoint::new("localhost", 5432), Arc::new(connector));
        (proxy, connects, executions)
    }

    #[tokio::test]
    async fn test_connection_info_before_first_command() {
        let (proxy, connects, _) = proxy_with(CountingConnector::default());

        let info = proxy.connection_info().await;

        assert_eq!(info.status, ConnectionStatus::NotInitialized);
        assert_eq!(info.host, "localhost");
        assert_eq!(info.port, 5432);
        assert_eq!(info.cache_size, Some(0));
        assert_eq!(info.access_count, Some(0));
        assert_eq!(connects.load(Ordering::SeqCst), 0);
        assert!(!proxy.is_initialized().await);
    }

    #[tokio::test]
    async fn test_cache_hit_bypasses_backend() {
        let (proxy, connects, executions) = proxy_with(CountingConnector::default());
        let query = Command::from("SELECT * FROM users WHERE age > 18");

        let first = proxy.execute(&query).await.unwrap();
        let second = proxy.execute(&query).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(executions.load(Ordering::SeqCst), 1);
        assert_eq!(connects.load(Ordering::SeqCst), 1);
        assert_eq!(proxy.access_count().await, 2);

        let info = proxy.connection_info().await;
        assert_eq!(info.status, ConnectionStatus::Connected);
        assert_eq!(info.cache_size, Some(1));
        assert_eq!(info.access_count, Some(2));
    }

    #[tokio::test]
    async fn test_fifo_eviction_forces_fresh_backend_call() {
        let (proxy, connects, executions) = proxy_with(CountingConnector::default());

        for q in ["Q1", "Q2", "Q3"] {
            proxy.execute(&Command::from(q)).await.unwrap();
        }
        // Reading Q1 again does not protect it from eviction
        proxy.execute(&Command::from("Q1")).await.unwrap();
        assert_eq!(executions.load(Ordering::SeqCst), 3);

        proxy.execute(&Command::from("Q4")).await.unwrap();
        let stats = proxy.cache_stats().await;
        assert_eq!(
            stats.cached_commands,
            vec![Command::from("Q2"), Command::from("Q3"), Command::from("Q4")]
        );

        proxy.execute(&Command::from("Q1")).await.unwrap();
        assert_eq!(executions.load(Ordering::SeqCst), 5);
        assert_eq!(connects.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_denied_command_short_circuits() {
        let (proxy, connects, executions) = proxy_with(CountingConnector::default());
        for q in ["Q1", "Q2", "Q3"] {
            proxy.execute(&Command::from(q)).await.unwrap();
        }
        let before = proxy.cache_stats().await;

        let err = proxy.execute(&Command::from("DROP TABLE x")).await.unwrap_err();

        assert!(matches!(err, GatehouseError::AccessDenied { ref keyword } if keyword == "DROP"));
        assert!(err.is_rejection());
        let after = proxy.cache_stats().await;
        assert_eq!(after.access_count, before.access_count + 1);
        assert_eq!(after.cache_size, before.cache_size);
        assert_eq!(after.cached_commands, before.cached_commands);
        assert_eq!(executions.load(Ordering::SeqCst), 3);
        assert_eq!(connects.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_denied_first_command_does_not_connect() {
        let (proxy, connects, _) = proxy_with(CountingConnector::default());

        assert!(proxy.execute(&Command::from("truncate logs")).await.is_err());

        assert_eq!(connects.load(Ordering::SeqCst), 0);
        let info = proxy.connection_info().await;
        assert_eq!(info.status, ConnectionStatus::NotInitialized);
        assert_eq!(info.access_count, Some(1));
    }

    #[tokio::test]
    async fn test_backend_failure_leaves_cache_untouched() {
        let (proxy, _, executions) = proxy_with(CountingConnector {
            fail_on: Some("BROKEN"),
            ..Default::default()
        });
        proxy.execute(&Command::from("Q1")).await.unwrap();

        let err = proxy.execute(&Command::from("BROKEN query")).await.unwrap_err();

        assert!(matches!(err, GatehouseError::BackendExec(_)));
        assert!(!err.is_rejection());
        let stats = proxy.cache_stats().await;
        assert_eq!(stats.cached_commands, vec![Command::from("Q1")]);

        // Not cached, so retrying reaches the backend again
        let _ = proxy.execute(&Command::from("BROKEN query")).await;
        assert_eq!(executions.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_connect_failure_propagates_and_retries_later() {
        let (proxy, connects, _) = proxy_with(CountingConnector {
            refuse: true,
            ..Default::default()
        });

        let err = proxy.execute(&Command::from("SELECT 1")).await.unwrap_err();
        assert!(matches!(err, GatehouseError::BackendConnect(_)));
        assert!(!proxy.is_initialized().await);
        assert_eq!(proxy.cache_stats().await.cache_size, 0);

        let _ = proxy.execute(&Command::from("SELECT 1")).await;
        assert_eq!(connects.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_clear_cache_keeps_backend_and_counter() {
        let (proxy, connects, executions) = proxy_with(CountingConnector::default());
        let query = Command::from("SELECT 1");
        proxy.execute(&query).await.unwrap();

        proxy.clear_cache().await;
        assert_eq!(proxy.cache_stats().await.cache_size, 0);

        proxy.execute(&query).await.unwrap();
        assert_eq!(executions.load(Ordering::SeqCst), 2);
        assert_eq!(connects.load(Ordering::SeqCst), 1);
        assert_eq!(proxy.access_count().await, 2);
    }

    #[tokio::test]
    async fn test_concurrent_first_access_connects_once() {
        let (proxy, connects, executions) = proxy_with(CountingConnector {
            delay: Some(Duration::from_millis(20)),
            ..Default::default()
        });
        let proxy = Arc::new(proxy);

        let calls = (0..16).map(|i| {
            let proxy = proxy.clone();
            tokio::spawn(async move {
                let command = Command::from(if i % 2 == 0 { "SELECT a" } else { "SELECT b" });
                proxy.execute(&command).await
            })
        });
        let results = futures::future::join_all(calls).await;

        assert!(results.into_iter().all(|r| r.unwrap().is_ok()));
        assert_eq!(connects.load(Ordering::SeqCst), 1);
        // Each distinct command reaches the backend exactly once
        assert_eq!(executions.load(Ordering::SeqCst), 2);
        assert_eq!(proxy.access_count().await, 16);
    }

    #[tokio::test]
    async fn test_from_config() {
        let mut config = GatehouseConfig::default();
        config.backend.host = "db.internal".to_string();
        config.cache.capacity = 1;
        config.access.restricted_keywords = vec!["GRANT".to_string()];

        let proxy = LazyResourceProxy::from_config(&config, Arc::new(CountingConnector::default()));

        assert_eq!(proxy.endpoint().host, "db.internal");
        assert!(proxy.execute(&Command::from("DROP TABLE t")).await.is_ok());
        assert!(proxy.execute(&Command::from("GRANT ALL")).await.is_err());
        proxy.execute(&Command::from("SELECT 1")).await.unwrap();
        assert_eq!(
            proxy.cache_stats().await.cached_commands,
            vec![Command::from("SELECT 1")]
        );
    }
}
