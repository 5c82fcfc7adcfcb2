//! Simulated database backend
//!
//! Stands in for a real database connection: establishing it and running
//! commands take configurable time, and results are canned strings chosen
//! by the kind of statement.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gatehouse_core::{BackendConfig, Connector, GatehouseError, Resource, Result};
use gatehouse_types::{Command, ConnectionInfo, ConnectionStatus, Endpoint};
use tracing::{debug, info};
use uuid::Uuid;

/// Canned result for a command, chosen by its statement kind
pub fn classify(command: &Command) -> &'static str {
    if command.contains_keyword("SELECT") {
        "query returned 100 rows"
    } else if command.contains_keyword("INSERT") {
        "record inserted"
    } else if command.contains_keyword("DELETE") {
        "record deleted"
    } else {
        "query executed"
    }
}

/// A connected (or closed) simulated database
pub struct SimulatedDatabase {
    endpoint: Endpoint,
    connection_id: Uuid,
    connected_at: DateTime<Utc>,
    connected: AtomicBool,
    query_delay: Duration,
    executed: Arc<AtomicU64>,
}

impl SimulatedDatabase {
    /// Open a connection, taking `connect_delay` to do so
    pub async fn connect(endpoint: Endpoint, connect_delay: Duration, query_delay: Duration) -> Self {
        info!(%endpoint, "initializing database connection");
        if !connect_delay.is_zero() {
            tokio::time::sleep(connect_delay).await;
        }

        let db = Self {
            endpoint,
            connection_id: Uuid::new_v4(),
            connected_at: Utc::now(),
            connected: AtomicBool::new(true),
            query_delay,
            executed: Arc::new(AtomicU64::new(0)),
        };
        info!(endpoint = %db.endpoint, connection_id = %db.connection_id, "database connection established");
        db
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Number of commands this connection has run
    pub fn executed(&self) -> u64 {
        self.executed.load(Ordering::SeqCst)
    }

    pub fn close(&self) {
        if self.connected.swap(false, Ordering::SeqCst) {
            info!(endpoint = %self.endpoint, "closing database connection");
        }
    }
}

#[async_trait]
impl Resource for SimulatedDatabase {
    async fn execute(&self, command: &Command) -> Result<String> {
        if !self.is_connected() {
            return Err(GatehouseError::BackendExec(
                "database is not connected".to_string(),
            ));
        }

        debug!(command = %command.preview(60), "running query");
        if !self.query_delay.is_zero() {
            tokio::time::sleep(self.query_delay).await;
        }
        self.executed.fetch_add(1, Ordering::SeqCst);

        Ok(classify(command).to_string())
    }

    async fn connection_info(&self) -> ConnectionInfo {
        let mut info = ConnectionInfo::connected(&self.endpoint, self.connected_at);
        if !self.is_connected() {
            info.status = ConnectionStatus::Disconnected;
        }
        info
    }
}

/// Opens [`SimulatedDatabase`] connections and counts how often it did so
#[derive(Debug, Clone, Default)]
pub struct SimulatedConnector {
    connect_delay: Duration,
    query_delay: Duration,
    refuse: bool,
    connects: Arc<AtomicUsize>,
    executed: Arc<AtomicU64>,
}

impl SimulatedConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &BackendConfig) -> Self {
        Self::new()
            .with_connect_delay(Duration::from_millis(config.connect_delay_ms))
            .with_query_delay(Duration::from_millis(config.query_delay_ms))
    }

    pub fn with_connect_delay(mut self, delay: Duration) -> Self {
        self.connect_delay = delay;
        self
    }

    pub fn with_query_delay(mut self, delay: Duration) -> Self {
        self.query_delay = delay;
        self
    }

    /// Make every connection attempt fail, as if the server were down
    pub fn refusing(mut self) -> Self {
        self.refuse = true;
        self
    }

    /// Connection attempts so far, shared across clones
    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    /// Commands run across every connection this connector opened
    pub fn executed_count(&self) -> u64 {
        self.executed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for SimulatedConnector {
    async fn connect(&self, endpoint: &Endpoint) -> Result<Arc<dyn Resource>> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if self.refuse {
            return Err(GatehouseError::BackendConnect(format!(
                "connection to {} refused",
                endpoint
            )));
        }

        let mut db = SimulatedDatabase::connect(endpoint.clone(), self.connect_delay, self.query_delay).await;
        db.executed = self.executed.clone();
        Ok(Arc::new(db))
    }
}
