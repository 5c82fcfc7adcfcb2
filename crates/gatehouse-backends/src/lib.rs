//! Backend implementations for Gatehouse

mod simulated;

pub use simulated::{classify, SimulatedConnector, SimulatedDatabase};

use gatehouse_core::GatehouseConfig;

/// Create the connector described by the backend section of `config`
pub fn create_connector(config: &GatehouseConfig) -> SimulatedConnector {
    SimulatedConnector::from_config(&config.backend)
}
