//! Error types for the Omnium simulator.
//!
//! Only *configuration* errors are representable as values: they are
//! detected before any worker starts and reported to the caller.
//! Invariant violations discovered mid-race (cell occupancy outside
//! bounds, a rank multiset that is not a permutation) indicate a
//! synchronization bug and abort the run via `panic!` instead of being
//! surfaced as a recoverable `Err`.

use std::error::Error;
use std::fmt;

/// Errors detected during [`RaceConfig::validate()`](crate::RaceConfig::validate).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// The track has fewer cells than the supported minimum.
    TrackTooShort {
        /// The configured track length that was too short.
        configured: usize,
    },
    /// Fewer riders than an elimination race needs.
    TooFewRiders {
        /// The configured rider count that was too small.
        configured: usize,
    },
    /// More riders than starting-grid cells.
    TooManyRiders {
        /// The configured rider count.
        riders: usize,
        /// The configured track length.
        track_length: usize,
    },
    /// A worker thread could not be spawned.
    ThreadSpawnFailed {
        /// Description of which thread failed.
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TrackTooShort { configured } => {
                write!(
                    f,
                    "track length {configured} is below the minimum of {}",
                    crate::config::MIN_TRACK_LENGTH
                )
            }
            Self::TooFewRiders { configured } => {
                write!(
                    f,
                    "rider count {configured} is below the minimum of {}",
                    crate::config::MIN_RIDERS
                )
            }
            Self::TooManyRiders {
                riders,
                track_length,
            } => {
                write!(
                    f,
                    "{riders} riders do not fit a starting grid on a {track_length}-cell track"
                )
            }
            Self::ThreadSpawnFailed { reason } => {
                write!(f, "thread spawn failed: {reason}")
            }
        }
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_mentions_the_offending_values() {
        let msg = ConfigError::TooManyRiders {
            riders: 12,
            track_length: 8,
        }
        .to_string();
        assert!(msg.contains("12"));
        assert!(msg.contains("8"));
    }

    #[test]
    fn thread_spawn_failed_display() {
        let err = ConfigError::ThreadSpawnFailed {
            reason: "rider-3: resource limit".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("thread spawn failed"));
        assert!(msg.contains("rider-3"));
    }
}
