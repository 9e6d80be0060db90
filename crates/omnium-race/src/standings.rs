//! The standings table: ranks, the elimination claim, and the
//! breakdown target.
//!
//! This is the owned coordinator object that replaces the original
//! simulation's process-wide counters and flags. Every shared counter
//! lives behind one mutex, so each operation here is linearizable:
//! exactly one rider can win the elimination claim per lap window, and
//! the breakdown target is consumed exactly once. An [`AtomicU32`]
//! mirror of the active-rider count lets riders and the chronometer
//! poll for termination without contending on the mutex.
//!
//! # Rank invariant
//!
//! At every quiescent point the ranks of active riders form a
//! contiguous permutation `1..=active_count`. The single exception is
//! the window between a breakdown and the chronometer's compaction
//! pass; while a compaction is pending the permutation check is
//! suspended, and [`apply_compaction`](Standings::apply_compaction)
//! restores and re-asserts it.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use omnium_core::{Rank, RiderId};

struct Inner {
    /// Rider slot -> rank value. Stale once the rider is inactive.
    place: Vec<u32>,
    /// Rider slot -> still racing.
    active: Vec<bool>,
    active_count: u32,
    /// One elimination per lap window; reset when the leader opens a
    /// new window.
    elimination_claimed: bool,
    /// Rank selected for breakdown in the current 4-lap window, if any.
    breakdown_target: Option<u32>,
    /// Pre-breakdown ranks of riders broken since the last compaction.
    pending_compaction: Vec<u32>,
    /// Rider slot -> final placement, recorded at retirement.
    final_rank: Vec<Option<u32>>,
}

impl Inner {
    /// Assert the rank invariant. Skipped while a compaction is
    /// pending, because a breakdown deliberately leaves a gap until the
    /// chronometer's between-tick pass.
    fn assert_permutation(&self) {
        if !self.pending_compaction.is_empty() {
            return;
        }
        let n = self.active_count as usize;
        let mut seen = vec![false; n];
        let mut count = 0usize;
        for (slot, &is_active) in self.active.iter().enumerate() {
            if !is_active {
                continue;
            }
            let p = self.place[slot] as usize;
            assert!(
                (1..=n).contains(&p),
                "rank {p} of rider {slot} outside 1..={n}"
            );
            assert!(!seen[p - 1], "rank {p} held by two active riders");
            seen[p - 1] = true;
            count += 1;
        }
        assert_eq!(count, n, "active flags disagree with active_count");
    }

    /// Drain pending breakdown compactions: every active rank worse
    /// than a broken rider's pre-breakdown rank moves up one place.
    fn compact(&mut self) {
        if self.pending_compaction.is_empty() {
            return;
        }
        let pending = std::mem::take(&mut self.pending_compaction);
        for pre in pending {
            for slot in 0..self.place.len() {
                if self.active[slot] && self.place[slot] > pre {
                    self.place[slot] -= 1;
                }
            }
        }
        self.assert_permutation();
    }
}

/// Shared standings for one race.
pub struct Standings {
    inner: Mutex<Inner>,
    active_mirror: AtomicU32,
}

impl Standings {
    /// Build the standings from the initial ranks, indexed by rider slot.
    ///
    /// # Panics
    ///
    /// Panics if `initial_ranks` is not a permutation of
    /// `1..=initial_ranks.len()`.
    pub fn new(initial_ranks: Vec<u32>) -> Self {
        let n = initial_ranks.len();
        let inner = Inner {
            place: initial_ranks,
            active: vec![true; n],
            active_count: n as u32,
            elimination_claimed: false,
            breakdown_target: None,
            pending_compaction: Vec::new(),
            final_rank: vec![None; n],
        };
        inner.assert_permutation();
        Self {
            inner: Mutex::new(inner),
            active_mirror: AtomicU32::new(n as u32),
        }
    }

    /// Number of riders still racing (lock-free).
    pub fn active_count(&self) -> u32 {
        self.active_mirror.load(Ordering::Acquire)
    }

    /// Current rank of an active rider.
    pub fn rank_of(&self, rider: RiderId) -> Rank {
        let inner = self.inner.lock().unwrap();
        debug_assert!(inner.active[rider.index()], "rank_of on inactive rider");
        Rank(inner.place[rider.index()])
    }

    /// Overtake resolution: if `other` currently holds a numerically
    /// better rank than `departing`, swap the two. Returns whether a
    /// swap happened.
    ///
    /// The caller has already filtered `other` by the lap rule (riders
    /// on a later lap cannot be overtaken by a same-or-earlier-lap
    /// rider sharing their cell).
    pub fn swap_if_better(&self, departing: RiderId, other: RiderId) -> bool {
        let mut inner = self.inner.lock().unwrap();
        if !inner.active[departing.index()] || !inner.active[other.index()] {
            return false;
        }
        let rd = inner.place[departing.index()];
        let ro = inner.place[other.index()];
        if ro >= rd {
            return false;
        }
        inner.place[departing.index()] = ro;
        inner.place[other.index()] = rd;
        inner.assert_permutation();
        true
    }

    /// Open a new lap window if `rider` is the current leader.
    ///
    /// Resets the elimination claim, and installs the breakdown target
    /// returned by `select` (which receives the active-rider count and
    /// returns `None` on non-qualifying laps). Returns whether the
    /// window opened.
    pub fn open_window_if_leader(
        &self,
        rider: RiderId,
        select: impl FnOnce(u32) -> Option<u32>,
    ) -> bool {
        let mut inner = self.inner.lock().unwrap();
        if !inner.active[rider.index()] || inner.place[rider.index()] != 1 {
            return false;
        }
        inner.elimination_claimed = false;
        if let Some(target) = select(inner.active_count) {
            inner.breakdown_target = Some(target);
        }
        true
    }

    /// Claim the elimination for this lap window.
    ///
    /// Succeeds only if the claim is unclaimed and `rider` holds the
    /// worst active rank; on success the rider is retired from the
    /// standings and its final placement recorded. The compare-and-set
    /// inside one lock scope is what makes a worst-rank tie resolve to
    /// exactly one elimination.
    pub fn try_eliminate(&self, rider: RiderId) -> Option<Rank> {
        let mut inner = self.inner.lock().unwrap();
        let slot = rider.index();
        // A sole survivor is the winner, never an elimination candidate,
        // even though its rank trivially equals the active count.
        if inner.active_count <= 1 {
            return None;
        }
        if inner.elimination_claimed || !inner.active[slot] {
            return None;
        }
        // The worst live rank equals `active_count` at compacted points,
        // but can exceed it while a breakdown compaction is pending, so
        // compare against the actual maximum.
        let worst = inner
            .place
            .iter()
            .zip(inner.active.iter())
            .filter(|&(_, &is_active)| is_active)
            .map(|(&p, _)| p)
            .max()
            .unwrap_or(0);
        if inner.place[slot] != worst {
            return None;
        }
        inner.elimination_claimed = true;
        // Final placement counts riders, not the possibly-uncompacted
        // rank value.
        let rank = inner.active_count;
        inner.active[slot] = false;
        inner.final_rank[slot] = Some(rank);
        inner.active_count -= 1;
        self.active_mirror.store(inner.active_count, Ordering::Release);
        // Removing the worst rank keeps the permutation contiguous.
        inner.assert_permutation();
        Some(Rank(rank))
    }

    /// Consume the breakdown target if it names `rider`'s current rank.
    pub fn take_breakdown_match(&self, rider: RiderId) -> bool {
        let mut inner = self.inner.lock().unwrap();
        let slot = rider.index();
        if !inner.active[slot] {
            return false;
        }
        if inner.breakdown_target == Some(inner.place[slot]) {
            inner.breakdown_target = None;
            true
        } else {
            false
        }
    }

    /// Retire `rider` as broken: its final rank becomes the current
    /// worst, and a compaction over its pre-breakdown rank is queued
    /// for the chronometer. Returns the final rank.
    pub fn mark_broken(&self, rider: RiderId) -> Rank {
        let mut inner = self.inner.lock().unwrap();
        let slot = rider.index();
        assert!(inner.active[slot], "breakdown of an inactive rider");
        let pre = inner.place[slot];
        let worst = inner.active_count;
        inner.place[slot] = worst;
        inner.final_rank[slot] = Some(worst);
        inner.active[slot] = false;
        inner.active_count -= 1;
        inner.pending_compaction.push(pre);
        self.active_mirror.store(inner.active_count, Ordering::Release);
        Rank(worst)
    }

    /// Apply any pending rank compaction, exactly once per breakdown.
    ///
    /// Run by the chronometer between ticks: every active rider whose
    /// rank is numerically worse than a broken rider's pre-breakdown
    /// rank moves up one place, restoring the contiguous permutation.
    pub fn apply_compaction(&self) {
        self.inner.lock().unwrap().compact();
    }

    /// Record the winner's final placement. Must be called by the last
    /// active rider once `active_count == 1`.
    ///
    /// Drains any compaction still pending — the winner may observe the
    /// last rival's breakdown before the chronometer's next pass.
    pub fn finalize_winner(&self, rider: RiderId) -> Rank {
        let mut inner = self.inner.lock().unwrap();
        inner.compact();
        let slot = rider.index();
        assert!(inner.active[slot], "winner is not active");
        assert_eq!(inner.active_count, 1, "winner finalized mid-race");
        let rank = inner.place[slot];
        assert_eq!(rank, 1, "sole active rider must hold rank 1");
        inner.final_rank[slot] = Some(rank);
        Rank(rank)
    }

    /// Final placements recorded so far, indexed by rider slot.
    pub fn final_ranks(&self) -> Vec<Option<Rank>> {
        let inner = self.inner.lock().unwrap();
        inner.final_rank.iter().map(|r| r.map(Rank)).collect()
    }
}
