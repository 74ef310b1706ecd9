//! Transport layer for the outbound device connection

use crate::error::Result;
use std::fmt;

mod mock;
mod tcp;
pub use mock::{MockEvent, MockTransport};
pub use tcp::{TcpTransport, TransportOptions};

/// Remote device address, resolved on every connect
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    /// Hostname or IP literal
    pub host: String,
    /// TCP port
    pub port: u16,
}

impl Endpoint {
    /// Create an endpoint from host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Transport trait for the single outbound stream connection
///
/// Owns at most one connection at a time. Implementations are not
/// synchronized; callers serialize access.
pub trait Transport: Send {
    /// Resolve the endpoint and open a connection
    ///
    /// Any previously open connection is released first.
    fn connect(&mut self, endpoint: &Endpoint) -> Result<()>;

    /// Write every byte of `data`, blocking until done or failed
    fn send_all(&mut self, data: &[u8]) -> Result<()>;

    /// Release the connection (no-op when already closed)
    fn close(&mut self);

    /// Whether a connection is currently open
    fn is_connected(&self) -> bool;
}
