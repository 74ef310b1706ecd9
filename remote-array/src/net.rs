//! Process-wide network stack initialization
//!
//! Some platforms need a one-time socket library start-up before the first
//! socket call. The standard library performs it internally, so this module
//! only tracks that the first socket operation has happened and logs it once.

use std::sync::Once;

static INIT: Once = Once::new();

/// Run the one-shot initialization if it has not run yet
///
/// Safe to call from any thread, any number of times.
pub fn ensure_initialized() {
    INIT.call_once(|| {
        log::debug!("Network stack initialized ({})", std::env::consts::OS);
    });
}
