//! Capacity-bounded circular track for the Omnium race simulator.
//!
//! The track is the only shared mutable structure in a race. It owns no
//! rider logic — only occupancy bookkeeping. Each cell carries two
//! independent synchronization primitives:
//!
//! - a counting **permit pool** of size [`CELL_CAPACITY`] providing
//!   blocking (or non-blocking) admission control, and
//! - a **structural lock** guarding the occupant set, taken only for the
//!   short window in which a rider registers or deregisters.
//!
//! Admission count and occupant identity are updated at different
//! moments of the movement protocol, so the two primitives must never
//! deadlock against each other. The protocol acquires, uses, and
//! releases the destination cell's structural lock strictly before
//! touching the origin cell's structural lock, giving a fixed global
//! lock order between concurrently-completing riders.
//!
//! [`CELL_CAPACITY`]: omnium_core::CELL_CAPACITY

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod cell;
pub mod track;

pub use cell::{Cell, PermitPool};
pub use track::{CellGuard, Track};
