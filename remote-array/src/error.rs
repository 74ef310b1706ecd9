//! Error types for remote-array

use crate::transport::Endpoint;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// remote-array error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Hostname did not resolve to any address
    #[error("Cannot resolve host {host}:{port}")]
    Resolution {
        /// Host as configured
        host: String,
        /// Port as configured
        port: u16,
    },

    /// OS-level connect failed
    #[error("Connect to {endpoint} failed: {source}")]
    Connect {
        /// Endpoint that refused the connection
        endpoint: Endpoint,
        /// Underlying socket error
        #[source]
        source: std::io::Error,
    },

    /// Write failure on an established connection
    #[error("Send failed: {0}")]
    Send(#[source] std::io::Error),

    /// Index outside `[0, len)`
    #[error("Index {index} out of range for array of length {len}")]
    IndexOutOfRange {
        /// Requested index (signed so negative input can be reported as given)
        index: i64,
        /// Array length
        len: usize,
    },

    /// Slice assignment with a value count that differs from the slice length
    #[error("Slice length mismatch: slice addresses {expected} records, got {actual}")]
    LengthMismatch {
        /// Records addressed by the slice
        expected: usize,
        /// Records supplied
        actual: usize,
    },

    /// Values are not a flat one-dimensional sequence
    #[error("Number of dimensions must be one, got {ndim}")]
    Dimension {
        /// Dimensions of the supplied buffer
        ndim: usize,
    },

    /// Record count does not fit the 16-bit length field
    #[error("Record count {count} exceeds frame limit of {max}", max = u16::MAX)]
    EncodingOverflow {
        /// Offending record count
        count: usize,
    },

    /// Reconnect-and-resync after a send failure did not succeed
    #[error("Reconnect failed: {source}")]
    ReconnectFailure {
        /// Error raised while closing, reconnecting or resending
        #[source]
        source: Box<Error>,
    },

    /// Slice with zero step or otherwise unusable bounds
    #[error("Invalid slice: {0}")]
    InvalidSlice(String),

    /// Byte sequence is not a well-formed frame
    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    /// Operation on an array that was explicitly closed
    #[error("Array is closed")]
    Closed,

    /// I/O error outside of the transport (config files)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration parse or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(e: toml::ser::Error) -> Self {
        Error::Config(e.to_string())
    }
}

impl Error {
    /// True for errors raised by a failed write on an open connection
    ///
    /// Only these trigger the reconnection policy; everything else propagates.
    pub fn is_send_failure(&self) -> bool {
        matches!(self, Error::Send(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_failure_classification() {
        let send = Error::Send(std::io::Error::from(std::io::ErrorKind::BrokenPipe));
        assert!(send.is_send_failure());
        assert!(!Error::Closed.is_send_failure());
        assert!(!Error::EncodingOverflow { count: 70_000 }.is_send_failure());
    }

    #[test]
    fn test_display_messages() {
        let e = Error::IndexOutOfRange { index: -1, len: 10 };
        assert_eq!(e.to_string(), "Index -1 out of range for array of length 10");

        let e = Error::EncodingOverflow { count: 65536 };
        assert_eq!(e.to_string(), "Record count 65536 exceeds frame limit of 65535");

        let inner = Error::Resolution {
            host: "nowhere.invalid".to_string(),
            port: 9999,
        };
        let e = Error::ReconnectFailure {
            source: Box::new(inner),
        };
        assert_eq!(
            e.to_string(),
            "Reconnect failed: Cannot resolve host nowhere.invalid:9999"
        );
    }
}
