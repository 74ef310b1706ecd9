//! TCP transport implementation

use super::{Endpoint, Transport};
use crate::error::{Error, Result};
use crate::net;
use std::io::{ErrorKind, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

/// Socket hardening options
///
/// All `None`/`false` by default, which leaves the OS defaults in place.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransportOptions {
    /// Upper bound for a single connect attempt
    pub connect_timeout: Option<Duration>,
    /// Upper bound for a single blocked write
    pub write_timeout: Option<Duration>,
    /// Disable Nagle's algorithm
    pub nodelay: bool,
}

/// Blocking TCP transport to one remote device
#[derive(Debug, Default)]
pub struct TcpTransport {
    stream: Option<TcpStream>,
    options: TransportOptions,
}

impl TcpTransport {
    /// Create an unconnected transport with OS-default socket behavior
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an unconnected transport with the given socket options
    pub fn with_options(options: TransportOptions) -> Self {
        Self {
            stream: None,
            options,
        }
    }

    /// Local address of the open connection, if any
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.stream.as_ref().and_then(|s| s.local_addr().ok())
    }

    /// Resolve `host:port` to socket addresses
    fn resolve(endpoint: &Endpoint) -> Result<Vec<SocketAddr>> {
        let resolution_error = || Error::Resolution {
            host: endpoint.host.clone(),
            port: endpoint.port,
        };

        let addrs: Vec<SocketAddr> = (endpoint.host.as_str(), endpoint.port)
            .to_socket_addrs()
            .map_err(|e| {
                log::debug!("Lookup of {} failed: {}", endpoint, e);
                resolution_error()
            })?
            .collect();

        if addrs.is_empty() {
            return Err(resolution_error());
        }
        Ok(addrs)
    }

    fn open(&self, addr: &SocketAddr) -> std::io::Result<TcpStream> {
        let stream = match self.options.connect_timeout {
            Some(timeout) => TcpStream::connect_timeout(addr, timeout)?,
            None => TcpStream::connect(addr)?,
        };
        stream.set_write_timeout(self.options.write_timeout)?;
        if self.options.nodelay {
            stream.set_nodelay(true)?;
        }
        Ok(stream)
    }
}

impl Transport for TcpTransport {
    fn connect(&mut self, endpoint: &Endpoint) -> Result<()> {
        net::ensure_initialized();
        self.close();

        let addrs = Self::resolve(endpoint)?;

        let mut last_error = None;
        for addr in &addrs {
            match self.open(addr) {
                Ok(stream) => {
                    log::info!("Connected to {} ({})", endpoint, addr);
                    self.stream = Some(stream);
                    return Ok(());
                }
                Err(e) => {
                    log::debug!("Connect to {} failed: {}", addr, e);
                    last_error = Some(e);
                }
            }
        }

        Err(Error::Connect {
            endpoint: endpoint.clone(),
            source: last_error.unwrap_or_else(|| ErrorKind::NotConnected.into()),
        })
    }

    fn send_all(&mut self, data: &[u8]) -> Result<()> {
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| Error::Send(ErrorKind::NotConnected.into()))?;

        // write_all retries on Interrupted and loops over partial writes
        stream.write_all(data).map_err(Error::Send)?;
        Ok(())
    }

    fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            if let Ok(addr) = stream.peer_addr() {
                log::info!("Closing connection to {}", addr);
            }
            let _ = stream.shutdown(Shutdown::Both);
        }
    }

    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }
}

impl Drop for TcpTransport {
    fn drop(&mut self) {
        self.close();
    }
}
