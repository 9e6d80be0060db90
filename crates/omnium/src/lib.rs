//! Omnium: a concurrent elimination-race simulator.
//!
//! One worker thread per rider races around a circular track of
//! capacity-bounded cells. Crossing the finish line completes a lap;
//! each lap window eliminates the worst-placed crosser, random
//! breakdowns thin the field further, and the last rider standing wins.
//!
//! This facade crate re-exports the public API of the sub-crates. For
//! most users a single `omnium` dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use omnium::prelude::*;
//! use std::time::Duration;
//!
//! let mut config = RaceConfig::new(16, 4, RaceMode::Uniform);
//! config.tick_period = Duration::from_millis(1);
//! config.seed = 42;
//!
//! let (world, events) = RaceWorld::new(config).unwrap();
//! let report = world.run().unwrap();
//!
//! assert_eq!(report.winner.rank, Rank(1));
//! assert_eq!(report.standings.len(), 4);
//!
//! // The event stream replays to the same standings.
//! let captured: Vec<_> = events.collect_all();
//! omnium::replay::verify(&report.standings, &captured).unwrap();
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`core`] | `omnium-core` | IDs, configuration, events, errors |
//! | [`track`] | `omnium-track` | The capacity-bounded circular track |
//! | [`race`] | `omnium-race` | Riders, referee, standings, world |
//! | [`replay`] | `omnium-replay` | Event-stream reconstruction and verify |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// IDs, configuration, events, and errors (`omnium-core`).
pub mod core {
    pub use omnium_core::*;
}

/// The capacity-bounded circular track (`omnium-track`).
pub mod track {
    pub use omnium_track::*;
}

/// Riders, rules, standings, and orchestration (`omnium-race`).
pub mod race {
    pub use omnium_race::*;
}

/// Event-stream replay and verification (`omnium-replay`).
pub mod replay {
    pub use omnium_replay::*;
}

/// The types most programs need.
pub mod prelude {
    pub use omnium_core::{
        CellIndex, ConfigError, EventKind, FinalPlacement, Pacing, RaceConfig, RaceEvent,
        RaceMode, Rank, RiderId, Tick,
    };
    pub use omnium_race::{EventStream, RaceMetrics, RaceReport, RaceWorld};
}
