//! Mirrored record array
//!
//! A fixed-length array of records whose contents are pushed to a remote
//! device on every [`MirroredArray::flush`]. Mutations are purely local
//! until flushed.
//!
//! # Example
//!
//! ```no_run
//! use remote_array::RemoteLed;
//!
//! let mut strip = RemoteLed::connect_with_fill("192.168.1.50", 9999, 60, 0)?;
//! strip.set(3, 0x00FF_0000)?;
//! strip.set_slice(10..13, &[0x0000_FF00; 3])?;
//! strip.flush(false)?;
//! strip.close();
//! # Ok::<(), remote_array::Error>(())
//! ```
//!
//! # Concurrency
//!
//! Not synchronized. Every mutating method takes `&mut self`, so safe Rust
//! callers are serialized by the borrow checker. Binding layers that hand
//! out iterators over copies of the buffer while allowing writes elsewhere
//! may observe any interleaving of old and new values; no consistent
//! snapshot is guaranteed.

use crate::error::{Error, Result};
use crate::frame;
use crate::reconnect::{LinkState, Reconnector};
use crate::record::{LedColor, Record};
use crate::slice::{BufferView, SliceSpec};
use crate::transport::{Endpoint, TcpTransport, Transport, TransportOptions};

/// Mirrored array of LED colors over TCP
pub type RemoteLed = MirroredArray<LedColor, TcpTransport>;

/// Counters for diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MirrorStats {
    /// Frames delivered to the transport, including resync frames
    pub frames_sent: u64,
    /// Bytes delivered to the transport
    pub bytes_sent: u64,
    /// Send failures that triggered the reconnection policy
    pub send_failures: u64,
    /// Successful reconnects
    pub reconnects: u64,
    /// Reconnect attempts that ended in [`Error::ReconnectFailure`]
    pub reconnect_failures: u64,
}

/// Fixed-length record array mirrored to a remote peer
pub struct MirroredArray<R: Record, T: Transport = TcpTransport> {
    local: Vec<R>,
    /// Last state known to have been sent. Written, never read.
    remote_shadow: Vec<R>,
    endpoint: Endpoint,
    transport: T,
    policy: Reconnector,
    frame_buf: Vec<u8>,
    stats: MirrorStats,
}

impl<R: Record> MirroredArray<R, TcpTransport> {
    /// Connect to `host:port` with `count` default-valued records
    pub fn connect(host: &str, port: u16, count: usize) -> Result<Self> {
        Self::connect_with_fill(host, port, count, R::default())
    }

    /// Connect to `host:port` with `count` records set to `fill`
    pub fn connect_with_fill(host: &str, port: u16, count: usize, fill: R) -> Result<Self> {
        Self::connect_with_options(host, port, count, fill, TransportOptions::default())
    }

    /// Connect with socket hardening options
    pub fn connect_with_options(
        host: &str,
        port: u16,
        count: usize,
        fill: R,
        options: TransportOptions,
    ) -> Result<Self> {
        Self::with_transport(
            TcpTransport::with_options(options),
            Endpoint::new(host, port),
            count,
            fill,
        )
    }
}

impl<R: Record, T: Transport> MirroredArray<R, T> {
    /// Build an array over any transport
    ///
    /// Connects and performs one forced flush so the device starts from a
    /// known state. Counts above 65535 are rejected with
    /// [`Error::EncodingOverflow`] before touching the network.
    pub fn with_transport(transport: T, endpoint: Endpoint, count: usize, fill: R) -> Result<Self> {
        frame::check_count(count)?;

        let mut array = Self {
            local: vec![fill; count],
            remote_shadow: vec![fill; count],
            endpoint,
            transport,
            policy: Reconnector::new(),
            frame_buf: Vec::with_capacity(frame::HEADER_LEN + count * R::SIZE),
            stats: MirrorStats::default(),
        };

        array.transport.connect(&array.endpoint)?;
        array.policy.mark_connected();
        array.flush(true)?;

        log::info!(
            "Mirroring {} records of {} bytes to {}",
            count,
            R::SIZE,
            array.endpoint
        );
        Ok(array)
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.local.len()
    }

    /// Whether the array holds no records
    pub fn is_empty(&self) -> bool {
        self.local.is_empty()
    }

    /// Read record `index`
    pub fn get(&self, index: usize) -> Result<R> {
        self.local
            .get(index)
            .copied()
            .ok_or_else(|| self.out_of_range(index))
    }

    /// Write record `index` locally; nothing is sent until `flush`
    pub fn set(&mut self, index: usize, value: R) -> Result<()> {
        if index >= self.local.len() {
            return Err(self.out_of_range(index));
        }
        self.local[index] = value;
        Ok(())
    }

    /// Assign `values` to the records addressed by `slice`
    pub fn set_slice(&mut self, slice: impl Into<SliceSpec>, values: &[R]) -> Result<()> {
        self.set_slice_view(slice, BufferView::flat(values))
    }

    /// Assign a shaped buffer to the records addressed by `slice`
    ///
    /// Checked before any write: the slice length must match the number of
    /// values ([`Error::LengthMismatch`]) and the buffer must be
    /// one-dimensional ([`Error::Dimension`]).
    pub fn set_slice_view(
        &mut self,
        slice: impl Into<SliceSpec>,
        values: BufferView<'_, R>,
    ) -> Result<()> {
        let resolved = slice.into().resolve(self.local.len())?;

        if resolved.len() != values.len() {
            return Err(Error::LengthMismatch {
                expected: resolved.len(),
                actual: values.len(),
            });
        }
        if values.ndim() != 1 {
            return Err(Error::Dimension {
                ndim: values.ndim(),
            });
        }

        for (index, value) in resolved.indices().zip(values.data()) {
            self.local[index] = *value;
        }
        Ok(())
    }

    /// Send the whole array to the device
    ///
    /// `force` is kept for callers that distinguish a resync from a routine
    /// update; both currently send the full array.
    ///
    /// A send failure runs the reconnection policy, which closes the link,
    /// reconnects and sends one forced full frame. Only if that fails does
    /// the caller see an error ([`Error::ReconnectFailure`]).
    pub fn flush(&mut self, force: bool) -> Result<()> {
        if self.policy.state() == LinkState::Closed {
            return Err(Error::Closed);
        }

        frame::encode_into(&mut self.frame_buf, 0, &self.local)?;
        log::debug!(
            "Flushing {} records ({} bytes, force={})",
            self.local.len(),
            self.frame_buf.len(),
            force
        );

        match self.transport.send_all(&self.frame_buf) {
            // A failed resync can leave the link open; a good send proves it
            Ok(()) => self.policy.mark_connected(),
            Err(e) if e.is_send_failure() => {
                self.stats.send_failures += 1;
                self.policy.on_send_failure(&self.endpoint, &e);
                let recovered =
                    self.policy
                        .recover(&mut self.transport, &self.endpoint, &self.frame_buf);
                self.stats.reconnects = self.policy.reconnects();
                self.stats.reconnect_failures = self.policy.failures();
                recovered?;
            }
            Err(e) => return Err(e),
        }

        self.stats.frames_sent += 1;
        self.stats.bytes_sent += self.frame_buf.len() as u64;
        self.remote_shadow.copy_from_slice(&self.local);
        Ok(())
    }

    /// Iterate over the local records in index order
    pub fn iter(&self) -> std::iter::Copied<std::slice::Iter<'_, R>> {
        self.local.iter().copied()
    }

    /// Read-only view of the contiguous local buffer
    pub fn as_slice(&self) -> &[R] {
        &self.local
    }

    /// Copy of the local records
    pub fn to_vec(&self) -> Vec<R> {
        self.local.clone()
    }

    /// Release the connection; later flushes fail with [`Error::Closed`]
    pub fn close(&mut self) {
        if self.policy.state() != LinkState::Closed {
            log::info!("Closing mirror to {}", self.endpoint);
        }
        self.policy.mark_closed();
        self.transport.close();
    }

    /// Whether `close` has been called
    pub fn is_closed(&self) -> bool {
        self.policy.state() == LinkState::Closed
    }

    /// Current link state
    pub fn link_state(&self) -> LinkState {
        self.policy.state()
    }

    /// Device endpoint
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Transfer and reconnect counters
    pub fn stats(&self) -> MirrorStats {
        self.stats
    }

    #[cfg(test)]
    pub(crate) fn remote_shadow(&self) -> &[R] {
        &self.remote_shadow
    }

    fn out_of_range(&self, index: usize) -> Error {
        Error::IndexOutOfRange {
            index: i64::try_from(index).unwrap_or(i64::MAX),
            len: self.local.len(),
        }
    }
}

impl<R: Record, T: Transport> Drop for MirroredArray<R, T> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<'a, R: Record, T: Transport> IntoIterator for &'a MirroredArray<R, T> {
    type Item = R;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, R>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Convert a signed index from a binding layer
///
/// Negative indices are out of range; they do not count from the end.
pub fn index_from_signed(index: i64, len: usize) -> Result<usize> {
    usize::try_from(index)
        .ok()
        .filter(|&i| i < len)
        .ok_or(Error::IndexOutOfRange { index, len })
}
