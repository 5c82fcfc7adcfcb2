//! Resource and connector traits

use std::sync::Arc;

use async_trait::async_trait;
use gatehouse_types::{Command, ConnectionInfo, Endpoint};

use crate::error::Result;

/// Anything that can run a command
///
/// Backends, the caching proxy and the authenticating proxy all implement
/// this trait, so they can wrap one another and callers need not know which
/// one they hold.
#[async_trait]
pub trait Resource: Send + Sync {
    /// Run a command and return its result
    async fn execute(&self, command: &Command) -> Result<String>;

    /// Describe the connection behind this resource
    ///
    /// Must never cause a backend to be constructed.
    async fn connection_info(&self) -> ConnectionInfo;
}

#[async_trait]
impl<R: Resource + ?Sized> Resource for Arc<R> {
    async fn execute(&self, command: &Command) -> Result<String> {
        (**self).execute(command).await
    }

    async fn connection_info(&self) -> ConnectionInfo {
        (**self).connection_info().await
    }
}

#[async_trait]
impl<R: Resource + ?Sized> Resource for Box<R> {
    async fn execute(&self, command: &Command) -> Result<String> {
        (**self).execute(command).await
    }

    async fn connection_info(&self) -> ConnectionInfo {
        (**self).connection_info().await
    }
}

/// Constructs the real backend on demand
///
/// This is the only place a proxy creates its backend, so the expensive
/// work can be deferred until a command actually needs it.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, endpoint: &Endpoint) -> Result<Arc<dyn Resource>>;
}

#[async_trait]
impl<C: Connector + ?Sized> Connector for Arc<C> {
    async fn connect(&self, endpoint: &Endpoint) -> Result<Arc<dyn Resource>> {
        (**self).connect(endpoint).await
    }
}
