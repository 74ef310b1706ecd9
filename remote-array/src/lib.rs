//! remote-array - fixed-length record arrays mirrored to a remote device
//!
//! Local writes are buffered in memory and pushed to the device as one
//! full-array frame per flush over a persistent TCP connection. A failed
//! send triggers a single reconnect-and-resync attempt.
//!
//! ## Modules
//!
//! - `array`: the mirrored container and its flush logic
//! - `frame`: wire encoding (`[offset:u16][length:u16][records]`)
//! - `transport`: TCP and mock transports behind the `Transport` trait
//! - `reconnect`: the reconnection state machine
//! - `neopixel`: NeoPixel-style facade for LED strips

pub mod array;
pub mod config;
pub mod error;
pub mod frame;
pub mod neopixel;
pub mod net;
pub mod reconnect;
pub mod record;
pub mod slice;
pub mod transport;

// Re-export commonly used types
pub use array::{MirrorStats, MirroredArray, RemoteLed, index_from_signed};
pub use config::MirrorConfig;
pub use error::{Error, Result};
pub use neopixel::{NeoPixel, color};
pub use reconnect::LinkState;
pub use record::{LedColor, Record};
pub use slice::{BufferView, SliceSpec};
pub use transport::{Endpoint, MockTransport, TcpTransport, Transport, TransportOptions};
