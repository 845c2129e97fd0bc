//! Core types shared by every adtstack crate.
//!
//! This crate defines the transport collaborator contract that endpoint
//! wrappers talk to ([`Transport`], [`AdtRequest`], [`AdtResponse`]), the
//! connection configuration loaded from the environment, and the transport
//! error type that is surfaced unchanged to callers.

mod config;
mod error;
mod transport;

pub use config::ConnectionConfig;
pub use error::{TransportError, TransportResult};
pub use transport::{AdtRequest, AdtResponse, Transport};
