//! Strongly-typed identifiers for riders, ticks, ranks, and track cells.

use std::fmt;

/// Identifies a rider within a race.
///
/// Riders are created once at race setup and assigned sequential IDs.
/// `RiderId(n)` indexes the n-th slot of the rider table; it is distinct
/// from the rider's shirt *number*, which comes from the randomized
/// starting order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RiderId(pub u32);

impl RiderId {
    /// The rider-table index as a `usize`.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for RiderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for RiderId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Monotonically increasing simulation tick counter.
///
/// Advanced by the chronometer once per simulation cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tick(pub u64);

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Tick {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// A rider's standing among active riders, 1 = leading.
///
/// At every tick boundary the ranks of all active riders form a
/// contiguous permutation `1..=active_count`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rank(pub u32);

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for Rank {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Index of a cell on the circular track.
///
/// Cell 0 is the finish/start line; indices wrap modulo the track length.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellIndex(pub usize);

impl CellIndex {
    /// The cell following this one on a track of `track_length` cells.
    ///
    /// Wraps from the last cell back to the finish line at cell 0.
    pub fn next(self, track_length: usize) -> CellIndex {
        CellIndex((self.0 + 1) % track_length)
    }

    /// Whether this cell is the finish/start line.
    pub fn is_finish_line(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for CellIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<usize> for CellIndex {
    fn from(v: usize) -> Self {
        Self(v)
    }
}
