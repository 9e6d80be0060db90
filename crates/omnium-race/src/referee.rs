//! Race rules applied during a move commit.
//!
//! The referee is a stateless rule set: all mutable race state lives in
//! the [`Standings`] and in the per-rider records. Rules run on the
//! moving rider's own thread, inside the cell-lock scopes laid out by
//! the movement protocol, so every state transition here is applied
//! exactly once per affected rider.

use omnium_core::{RaceMode, Rank, RiderId};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;

use crate::rider::{Rider, RiderStatus, SpeedClass};
use crate::standings::Standings;

/// Breakdown probability: 1 in 100, rolled when a rider matches the
/// breakdown target.
pub const BREAKDOWN_CHANCE: (u32, u32) = (1, 100);

/// The final riders immune to breakdown: once `active_count` is at or
/// below this, nobody breaks.
pub const BREAKDOWN_IMMUNITY: u32 = 3;

/// A breakdown target is selected every time the leader starts a lap
/// one past a multiple of this stride.
pub const BREAKDOWN_LAP_STRIDE: u32 = 4;

/// Outcome of the lap-completion rules for a finish-line crossing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LapVerdict {
    /// The rider survives the crossing and keeps racing.
    Continue,
    /// The rider held the worst active rank and lost the elimination
    /// claim race; the rank is its final placement.
    Eliminated(Rank),
    /// The rider matched the breakdown target and failed the 1-in-100
    /// roll; the rank is its final placement.
    Broken(Rank),
}

/// The rule set for one race.
pub struct Referee {
    mode: RaceMode,
}

impl Referee {
    /// Build the referee for the configured race mode.
    pub fn new(mode: RaceMode) -> Self {
        Self { mode }
    }

    /// Lap-completion rules, run under the finish cell's structural
    /// lock when a rider's destination is cell 0.
    ///
    /// In order: increment the lap; if this rider leads, open a new
    /// elimination window (and select a breakdown target on qualifying
    /// laps); eliminate the worst-ranked crosser past lap 1; run the
    /// breakdown rule on a target match.
    pub fn lap_completed(
        &self,
        standings: &Standings,
        rider: &Rider,
        rng: &mut ChaCha8Rng,
    ) -> LapVerdict {
        let lap = rider.complete_lap();

        standings.open_window_if_leader(rider.id, |active_count| {
            if lap % BREAKDOWN_LAP_STRIDE == 1 {
                Some(rng.gen_range(1..=active_count))
            } else {
                None
            }
        });

        if lap > 1 {
            if let Some(rank) = standings.try_eliminate(rider.id) {
                rider.retire(RiderStatus::Eliminated);
                return LapVerdict::Eliminated(rank);
            }
        }

        if standings.take_breakdown_match(rider.id) {
            if let Some(rank) = self.roll_breakdown(standings, rider, rng) {
                return LapVerdict::Broken(rank);
            }
        }

        LapVerdict::Continue
    }

    /// Checks for a rider that stays in its cell this tick (slow-class
    /// half-step): no occupancy changes, but a pending breakdown target
    /// can still fire against its rank.
    pub fn stationary_checks(
        &self,
        standings: &Standings,
        rider: &Rider,
        rng: &mut ChaCha8Rng,
    ) -> Option<Rank> {
        if standings.take_breakdown_match(rider.id) {
            self.roll_breakdown(standings, rider, rng)
        } else {
            None
        }
    }

    /// The breakdown rule: 1-in-100 while more than
    /// [`BREAKDOWN_IMMUNITY`] riders remain. On success the rider is
    /// retired and its pre-breakdown rank queued for compaction.
    fn roll_breakdown(
        &self,
        standings: &Standings,
        rider: &Rider,
        rng: &mut ChaCha8Rng,
    ) -> Option<Rank> {
        if standings.active_count() <= BREAKDOWN_IMMUNITY {
            return None;
        }
        if !rng.gen_ratio(BREAKDOWN_CHANCE.0, BREAKDOWN_CHANCE.1) {
            return None;
        }
        let rank = standings.mark_broken(rider.id);
        rider.retire(RiderStatus::Broken);
        Some(rank)
    }

    /// Overtake resolution for a rider departing (or parked in) a cell,
    /// run under that cell's structural lock.
    ///
    /// For every co-occupant on the same or an earlier lap that holds a
    /// better rank, the two ranks swap — only a full overtake changes
    /// the leaderboard. Returns the number of swaps.
    pub fn resolve_overtakes(
        &self,
        standings: &Standings,
        departing: &Rider,
        occupants: &[RiderId],
        riders: &[Arc<Rider>],
    ) -> u32 {
        let my_lap = departing.lap();
        let mut swaps = 0;
        for &other_id in occupants {
            if other_id == departing.id {
                continue;
            }
            let other = &riders[other_id.index()];
            if !other.is_active() || other.lap() > my_lap {
                continue;
            }
            if standings.swap_if_better(departing.id, other_id) {
                swaps += 1;
            }
        }
        swaps
    }

    /// Re-roll the speed class after a lap completion in variable mode.
    ///
    /// Returns `None` in uniform mode, where speed never changes.
    pub fn reroll_speed(&self, rng: &mut ChaCha8Rng) -> Option<SpeedClass> {
        match self.mode {
            RaceMode::Uniform => None,
            RaceMode::Variable => Some(if rng.gen_bool(0.5) {
                SpeedClass::Fast
            } else {
                SpeedClass::Slow
            }),
        }
    }
}
