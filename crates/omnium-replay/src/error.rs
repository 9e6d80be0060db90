//! Error types for event-stream replay.

use std::error::Error;
use std::fmt;

use omnium_core::RiderId;

/// Errors raised while reconstructing or verifying a race from its
/// event stream.
#[derive(Debug, PartialEq, Eq)]
pub enum ReplayError {
    /// A rider produced a second terminal event.
    DuplicateTerminal {
        /// The rider with more than one terminal event.
        rider: RiderId,
    },
    /// The stream contains no `Finished` event.
    NoFinisher,
    /// The stream contains more than one `Finished` event.
    MultipleFinishers {
        /// The first finisher seen.
        first: RiderId,
        /// The conflicting second finisher.
        second: RiderId,
    },
    /// The winner's terminal event does not carry rank 1.
    WinnerNotFirst {
        /// The rank the `Finished` event carried.
        found: u32,
    },
    /// Two terminal events claim the same final rank.
    DuplicateRank {
        /// The contested rank.
        rank: u32,
        /// The rider that claimed it first.
        first: RiderId,
        /// The rider that claimed it second.
        second: RiderId,
    },
    /// The final ranks are not the contiguous range `1..=n`.
    RankGap {
        /// The first missing rank.
        expected: u32,
        /// The rank actually found at that position.
        found: u32,
    },
    /// A rider's lap counter decreased between two of its events.
    LapRegression {
        /// The rider whose laps went backward.
        rider: RiderId,
        /// Lap on the earlier event.
        from: u32,
        /// Lap on the later event.
        to: u32,
    },
    /// Reconstructed and live standings disagree at one rank.
    Divergence {
        /// The rank at which they disagree.
        rank: u32,
        /// The rider the live report placed there.
        live: RiderId,
        /// The rider the event stream placed there.
        replayed: RiderId,
    },
    /// Live and reconstructed standings have different lengths.
    LengthMismatch {
        /// Number of placements in the live report.
        live: usize,
        /// Number of placements reconstructed from events.
        replayed: usize,
    },
}

impl fmt::Display for ReplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateTerminal { rider } => {
                write!(f, "rider {rider} produced two terminal events")
            }
            Self::NoFinisher => write!(f, "event stream has no Finished event"),
            Self::MultipleFinishers { first, second } => {
                write!(f, "two finishers in one race: {first} and {second}")
            }
            Self::WinnerNotFirst { found } => {
                write!(f, "Finished event carries rank {found}, expected 1")
            }
            Self::DuplicateRank {
                rank,
                first,
                second,
            } => write!(
                f,
                "rank {rank} claimed by both {first} and {second}"
            ),
            Self::RankGap { expected, found } => {
                write!(f, "final ranks skip {expected} (found {found})")
            }
            Self::LapRegression { rider, from, to } => {
                write!(f, "rider {rider} lap went backward: {from} -> {to}")
            }
            Self::Divergence {
                rank,
                live,
                replayed,
            } => write!(
                f,
                "standings diverge at rank {rank}: live {live}, replayed {replayed}"
            ),
            Self::LengthMismatch { live, replayed } => write!(
                f,
                "standings length mismatch: live {live}, replayed {replayed}"
            ),
        }
    }
}

impl Error for ReplayError {}
