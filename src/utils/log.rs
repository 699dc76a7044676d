// src/utils/log.rs

//! Structured logging for the codec.
//!
//! Library code emits events through the `tracing` macros re-exported here;
//! nothing is printed until the embedding application installs a subscriber.
//!
//! ```
//! use bitonal_encoder::utils::log::{init_subscriber, Level};
//! init_subscriber(Level::DEBUG);
//! ```
//!
//! Pipeline stages log at `debug` (shape counts, buffer sizes) and the shape
//! codec logs its per-shape scan-order choice at `trace`.

pub use tracing::{Level, debug, info, trace, warn};
use tracing_subscriber::FmtSubscriber;

/// Installs a global subscriber that logs to standard error.
///
/// Returns `false` if a global subscriber was already installed, in which case
/// the existing one is left in place.
pub fn init_subscriber(max_level: Level) -> bool {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(max_level)
        .with_thread_ids(true)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_refused() {
        // Whichever call wins, the later one must not replace it.
        let _ = init_subscriber(Level::TRACE);
        assert!(!init_subscriber(Level::INFO));
    }
}
