//! Event-stream replay and verification for Omnium races.
//!
//! A race is fully described by its structured event stream: terminal
//! events carry each rider's final placement, so the standings can be
//! rebuilt offline and compared against the live report.
//!
//! - [`reconstruct_standings`] folds a captured stream back into a
//!   ranked placement table, validating stream invariants as it goes.
//! - [`verify`] cross-checks a live result against its own stream and
//!   reports the first divergence.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod reconstruct;
pub mod verify;

pub use error::ReplayError;
pub use reconstruct::reconstruct_standings;
pub use verify::verify;
