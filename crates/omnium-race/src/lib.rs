//! Race engine for the Omnium track race simulator.
//!
//! One worker thread per rider plus a chronometer thread drive a race
//! to its single winner. The crate is organized around the actors and
//! the shared state they contend over:
//!
//! - [`rider`] — per-rider records: lap counter, lifecycle status,
//!   speed classes.
//! - [`standings`] — the live leaderboard: a contiguous rank
//!   permutation over the active riders, the per-window elimination
//!   claim, and the breakdown target.
//! - [`referee`] — the rules: lap completion, worst-rank elimination,
//!   stochastic breakdown, overtake rank swaps.
//! - [`protocol`] — the movement protocol workers execute each tick.
//! - [`chronometer`] — start gate, tick clock, tick barrier, and the
//!   pacing thread.
//! - [`egress`] — the structured event stream observers consume.
//! - [`metrics`] — cumulative race counters.
//! - [`world`] — orchestration: build from a [`RaceConfig`], run,
//!   report.
//!
//! [`RaceConfig`]: omnium_core::RaceConfig

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod chronometer;
pub mod egress;
pub mod metrics;
pub mod protocol;
pub mod referee;
pub mod rider;
pub mod standings;
pub mod world;

pub use chronometer::{Chronometer, StartGate, TickBarrier, TickClock};
pub use egress::{event_channel, EventSink, EventStream};
pub use metrics::{MetricsRecorder, RaceMetrics};
pub use referee::{LapVerdict, Referee};
pub use rider::{Rider, RiderStatus, SpeedClass};
pub use standings::Standings;
pub use world::{RaceReport, RaceWorld};
