//! Mock transport for testing

use super::{Endpoint, Transport};
use crate::error::{Error, Result};
use parking_lot::Mutex;
use std::io::ErrorKind;
use std::sync::Arc;

/// Transport call recorded by [`MockTransport`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockEvent {
    /// Successful connect to the endpoint
    Connect(Endpoint),
    /// Connect that was scripted to fail
    ConnectFailed(Endpoint),
    /// Successful send of the given bytes
    Send(Vec<u8>),
    /// Send that was scripted to fail
    SendFailed,
    /// Close of an open connection
    Close,
}

/// Mock transport for unit testing
///
/// Clones share state, so a test can keep one handle while the array owns
/// another.
#[derive(Clone, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<MockTransportInner>>,
}

#[derive(Default)]
struct MockTransportInner {
    connected: bool,
    events: Vec<MockEvent>,
    fail_sends: usize,
    fail_connects: usize,
}

impl MockTransport {
    /// Create a new mock transport
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` sends fail with a broken pipe
    pub fn fail_next_sends(&self, count: usize) {
        self.inner.lock().fail_sends = count;
    }

    /// Make the next `count` connects fail with connection refused
    pub fn fail_next_connects(&self, count: usize) {
        self.inner.lock().fail_connects = count;
    }

    /// All recorded calls, oldest first
    pub fn events(&self) -> Vec<MockEvent> {
        self.inner.lock().events.clone()
    }

    /// Payloads of successful sends, oldest first
    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.inner
            .lock()
            .events
            .iter()
            .filter_map(|e| match e {
                MockEvent::Send(bytes) => Some(bytes.clone()),
                _ => None,
            })
            .collect()
    }

    /// Number of successful connects
    pub fn connect_count(&self) -> usize {
        self.count(|e| matches!(e, MockEvent::Connect(_)))
    }

    /// Number of closes of an open connection
    pub fn close_count(&self) -> usize {
        self.count(|e| matches!(e, MockEvent::Close))
    }

    /// Clear recorded calls
    pub fn clear_events(&self) {
        self.inner.lock().events.clear();
    }

    fn count(&self, pred: impl Fn(&MockEvent) -> bool) -> usize {
        self.inner.lock().events.iter().filter(|e| pred(e)).count()
    }
}

impl Transport for MockTransport {
    fn connect(&mut self, endpoint: &Endpoint) -> Result<()> {
        let mut inner = self.inner.lock();
        if inner.connected {
            inner.connected = false;
            inner.events.push(MockEvent::Close);
        }

        if inner.fail_connects > 0 {
            inner.fail_connects -= 1;
            inner.events.push(MockEvent::ConnectFailed(endpoint.clone()));
            return Err(Error::Connect {
                endpoint: endpoint.clone(),
                source: ErrorKind::ConnectionRefused.into(),
            });
        }

        inner.connected = true;
        inner.events.push(MockEvent::Connect(endpoint.clone()));
        Ok(())
    }

    fn send_all(&mut self, data: &[u8]) -> Result<()> {
        let mut inner = self.inner.lock();
        if !inner.connected {
            return Err(Error::Send(ErrorKind::NotConnected.into()));
        }

        if inner.fail_sends > 0 {
            inner.fail_sends -= 1;
            inner.events.push(MockEvent::SendFailed);
            return Err(Error::Send(ErrorKind::BrokenPipe.into()));
        }

        inner.events.push(MockEvent::Send(data.to_vec()));
        Ok(())
    }

    fn close(&mut self) {
        let mut inner = self.inner.lock();
        if inner.connected {
            inner.connected = false;
            inner.events.push(MockEvent::Close);
        }
    }

    fn is_connected(&self) -> bool {
        self.inner.lock().connected
    }
}
