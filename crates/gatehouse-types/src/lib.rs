//! Gatehouse Types - Plain data shared by the proxy, its backends and callers
//!
//! This crate has no async runtime dependency; everything here is a value
//! type that can be serialized for reporting.

pub mod command;
pub mod connection;
pub mod identity;

pub use command::*;
pub use connection::*;
pub use identity::*;
