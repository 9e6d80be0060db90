//! Core types for the Omnium track race simulator.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the fundamental vocabulary used throughout the Omnium workspace:
//! strongly-typed identifiers, the validated race configuration, the
//! structured event stream, and the error taxonomy.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod event;
pub mod id;

pub use config::{Pacing, RaceConfig, RaceMode, CELL_CAPACITY, MIN_RIDERS, MIN_TRACK_LENGTH};
pub use error::ConfigError;
pub use event::{EventKind, FinalPlacement, RaceEvent};
pub use id::{CellIndex, Rank, RiderId, Tick};
