//! Reconnection policy
//!
//! Two live states plus a terminal one:
//!
//! ```text
//!              send failure
//!  Connected ───────────────▶ Disconnected
//!      ▲                          │
//!      └── close, connect, ───────┘
//!          forced full frame
//!
//!  close() from any state ──▶ Closed (terminal)
//! ```
//!
//! Recovery is attempted exactly once per failure. There is no backoff, no
//! retry limit and no circuit breaker: it either succeeds or the error is
//! handed back to the caller as [`Error::ReconnectFailure`].

use crate::error::{Error, Result};
use crate::transport::{Endpoint, Transport};

/// Connection state as seen by the policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// Last send (or connect) succeeded
    Connected,
    /// A send failed and the link has not been re-established
    Disconnected,
    /// Explicitly closed; no further reconnection
    Closed,
}

/// Single-attempt reconnect-and-resync state machine
#[derive(Debug)]
pub struct Reconnector {
    state: LinkState,
    reconnects: u64,
    failures: u64,
}

impl Default for Reconnector {
    fn default() -> Self {
        Self::new()
    }
}

impl Reconnector {
    /// Policy for a link that has not connected yet
    pub fn new() -> Self {
        Self {
            state: LinkState::Disconnected,
            reconnects: 0,
            failures: 0,
        }
    }

    /// Current state
    pub fn state(&self) -> LinkState {
        self.state
    }

    /// Successful reconnects so far
    pub fn reconnects(&self) -> u64 {
        self.reconnects
    }

    /// Failed reconnect attempts so far
    pub fn failures(&self) -> u64 {
        self.failures
    }

    /// Record an initial successful connect
    pub fn mark_connected(&mut self) {
        if self.state != LinkState::Closed {
            self.state = LinkState::Connected;
        }
    }

    /// Enter the terminal state
    pub fn mark_closed(&mut self) {
        self.state = LinkState::Closed;
    }

    /// Record a send failure (Connected → Disconnected)
    pub fn on_send_failure(&mut self, endpoint: &Endpoint, error: &Error) {
        if self.state == LinkState::Connected {
            log::warn!("Send to {} failed: {}", endpoint, error);
        }
        if self.state != LinkState::Closed {
            self.state = LinkState::Disconnected;
        }
    }

    /// Close, reconnect and send one forced full frame
    ///
    /// `frame` must already hold the full-array frame built from local state.
    pub fn recover<T: Transport + ?Sized>(
        &mut self,
        transport: &mut T,
        endpoint: &Endpoint,
        frame: &[u8],
    ) -> Result<()> {
        if self.state == LinkState::Closed {
            return Err(Error::Closed);
        }

        log::info!("Reconnecting to {}", endpoint);
        transport.close();

        let resync = transport
            .connect(endpoint)
            .and_then(|()| transport.send_all(frame));

        match resync {
            Ok(()) => {
                self.state = LinkState::Connected;
                self.reconnects += 1;
                log::info!(
                    "Reconnected to {} and resynced {} bytes (reconnect #{})",
                    endpoint,
                    frame.len(),
                    self.reconnects
                );
                Ok(())
            }
            Err(e) => {
                self.state = LinkState::Disconnected;
                self.failures += 1;
                log::error!("Reconnect to {} failed: {}", endpoint, e);
                Err(Error::ReconnectFailure {
                    source: Box::new(e),
                })
            }
        }
    }
}
