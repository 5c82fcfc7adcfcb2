//! Gatehouse - Core Library
//!
//! Proxies that stand between callers and an expensive backend resource:
//! lazy construction, a bounded result cache, keyword access control and an
//! authentication gate, all composable through the [`Resource`] trait.

pub mod auth;
pub mod cache;
pub mod config;
pub mod credential;
pub mod error;
pub mod policy;
pub mod proxy;
pub mod resource;

pub use auth::*;
pub use cache::*;
pub use config::*;
pub use credential::*;
pub use error::*;
pub use policy::*;
pub use proxy::*;
pub use resource::*;

pub use gatehouse_types as types;
