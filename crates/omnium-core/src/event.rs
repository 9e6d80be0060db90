//! Structured race events.
//!
//! Riders emit one [`RaceEvent`] per state-changing action. The stream
//! is causally ordered per rider (each rider's events appear in the
//! order that rider produced them); no total order across riders is
//! promised. A race produces exactly one [`EventKind::Finished`] event,
//! and the terminal events of all riders carry the final standings —
//! replaying the stream must reproduce the same permutation the live
//! run produced.

use std::fmt;

use crate::id::{Rank, RiderId, Tick};

/// What happened to a rider.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventKind {
    /// The rider advanced one cell.
    Move,
    /// The rider crossed the finish line and started a new lap.
    LapComplete,
    /// The rider held the worst active rank while crossing the finish
    /// line and was removed from the race.
    Eliminated,
    /// The rider suffered a stochastic mechanical breakdown.
    Broken,
    /// The rider is the last one standing and won the race.
    Finished,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Move => "move",
            Self::LapComplete => "lap-complete",
            Self::Eliminated => "eliminated",
            Self::Broken => "broken",
            Self::Finished => "finished",
        };
        f.write_str(s)
    }
}

impl EventKind {
    /// Whether this event removes the rider from the race.
    ///
    /// Terminal events carry the rider's final rank; every rider emits
    /// exactly one of them.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Eliminated | Self::Broken | Self::Finished)
    }
}

/// One structured record in the race event stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RaceEvent {
    /// Rider-table slot of the rider this event concerns.
    pub rider: RiderId,
    /// The rider's shirt number from the randomized starting order.
    pub number: u32,
    /// What happened.
    pub kind: EventKind,
    /// The rider's lap count after this event.
    pub lap: u32,
    /// The rider's rank at the time of the event. For terminal events
    /// this is the rider's final placement.
    pub rank: Rank,
    /// The simulation tick the event occurred on.
    pub tick: Tick,
}

impl fmt::Display for RaceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "tick {:>6} | rider #{:<3} {:<12} lap {:<3} rank {}",
            self.tick, self.number, self.kind, self.lap, self.rank
        )
    }
}

/// A rider's final placement in the standings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FinalPlacement {
    /// Rider-table slot.
    pub rider: RiderId,
    /// Shirt number.
    pub number: u32,
    /// Final rank: 1 for the winner, `rider_count` for the first rider out.
    pub rank: Rank,
}
