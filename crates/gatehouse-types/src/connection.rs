//! Connection and cache reporting types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Command;

/// Address of the backend a proxy will connect to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Connection status of a backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    NotInitialized,
    Connected,
    Disconnected,
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionStatus::NotInitialized => write!(f, "not_initialized"),
            ConnectionStatus::Connected => write!(f, "connected"),
            ConnectionStatus::Disconnected => write!(f, "disconnected"),
        }
    }
}

/// Connection report returned by every resource
///
/// Backends fill in the address and status. Proxies layer their own
/// bookkeeping on top (`cache_size`, `access_count`, `user`, `authenticated`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionInfo {
    pub host: String,
    pub port: u16,
    pub status: ConnectionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connected_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authenticated: Option<bool>,
}

impl ConnectionInfo {
    pub fn new(endpoint: &Endpoint, status: ConnectionStatus) -> Self {
        Self {
            host: endpoint.host.clone(),
            port: endpoint.port,
            status,
            connected_at: None,
            cache_size: None,
            access_count: None,
            user: None,
            authenticated: None,
        }
    }

    /// Report for a backend that has not been constructed yet
    pub fn not_initialized(endpoint: &Endpoint) -> Self {
        Self::new(endpoint, ConnectionStatus::NotInitialized)
    }

    pub fn connected(endpoint: &Endpoint, connected_at: DateTime<Utc>) -> Self {
        Self {
            connected_at: Some(connected_at),
            ..Self::new(endpoint, ConnectionStatus::Connected)
        }
    }
}

/// Snapshot returned by `cache_stats()`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Cached commands, oldest first
    pub cached_commands: Vec<Command>,
    pub cache_size: usize,
    pub access_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_initialized_omits_proxy_fields() {
        let info = ConnectionInfo::not_initialized(&Endpoint::new("localhost", 5432));
        let json = serde_json::to_value(&info).unwrap();

        assert_eq!(json["status"], "not_initialized");
        assert_eq!(json["host"], "localhost");
        assert_eq!(json["port"], 5432);
        assert!(json.get("cache_size").is_none());
        assert!(json.get("authenticated").is_none());
    }

    #[test]
    fn test_endpoint_display() {
        assert_eq!(Endpoint::new("db.example.com", 3306).to_string(), "db.example.com:3306");
    }
}
