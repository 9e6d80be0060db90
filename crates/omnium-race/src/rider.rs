//! Shared per-rider records and speed classes.
//!
//! The fields a rider's own worker thread mutates every tick (position,
//! half-step flag, speed class) are *not* here — they live in the worker
//! and are never shared. This module holds only the slice of rider state
//! that other actors legitimately observe: the lap counter (read by
//! overtake resolution without taking a second lock) and the status
//! (read by the chronometer and final reporting).

use std::sync::atomic::{AtomicU32, AtomicU8, Ordering};

use omnium_core::RiderId;

/// The two discrete speed classes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpeedClass {
    /// Advances one cell every second tick, alternating with a
    /// stationary half-tick.
    Slow,
    /// Advances one cell every tick.
    Fast,
}

impl SpeedClass {
    /// Cells advanced this tick given the current half-step flag.
    pub fn displacement(self, half: bool) -> usize {
        match self {
            Self::Fast => 1,
            Self::Slow => usize::from(half),
        }
    }
}

/// A rider's lifecycle status.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RiderStatus {
    /// Still racing.
    Active,
    /// Suffered a stochastic breakdown.
    Broken,
    /// Removed as the worst-placed rider of a lap window.
    Eliminated,
}

const STATUS_ACTIVE: u8 = 0;
const STATUS_BROKEN: u8 = 1;
const STATUS_ELIMINATED: u8 = 2;

/// Shared record for one rider. Never deallocated mid-race; a broken or
/// eliminated rider's worker exits its movement loop but the record
/// persists for final reporting.
pub struct Rider {
    /// Rider-table slot.
    pub id: RiderId,
    /// Shirt number from the randomized starting order.
    pub number: u32,
    lap: AtomicU32,
    status: AtomicU8,
}

impl Rider {
    /// Create an active rider on its first lap.
    pub fn new(id: RiderId, number: u32) -> Self {
        Self {
            id,
            number,
            lap: AtomicU32::new(1),
            status: AtomicU8::new(STATUS_ACTIVE),
        }
    }

    /// Current lap count. Monotonically non-decreasing.
    pub fn lap(&self) -> u32 {
        self.lap.load(Ordering::Acquire)
    }

    /// Increment the lap counter and return the new lap.
    ///
    /// Called exactly once per finish-line crossing, by the rider's own
    /// worker, under the finish cell's structural lock.
    pub fn complete_lap(&self) -> u32 {
        self.lap.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Current status.
    pub fn status(&self) -> RiderStatus {
        match self.status.load(Ordering::Acquire) {
            STATUS_ACTIVE => RiderStatus::Active,
            STATUS_BROKEN => RiderStatus::Broken,
            STATUS_ELIMINATED => RiderStatus::Eliminated,
            other => unreachable!("corrupt rider status byte {other}"),
        }
    }

    /// Whether the rider is still racing.
    pub fn is_active(&self) -> bool {
        self.status.load(Ordering::Acquire) == STATUS_ACTIVE
    }

    /// Transition out of `Active`, exactly once.
    ///
    /// # Panics
    ///
    /// Panics if the rider already left `Active` (a double elimination
    /// or elimination-after-breakdown is a synchronization bug) or if
    /// `status` is `Active`.
    pub fn retire(&self, status: RiderStatus) {
        let target = match status {
            RiderStatus::Broken => STATUS_BROKEN,
            RiderStatus::Eliminated => STATUS_ELIMINATED,
            RiderStatus::Active => panic!("cannot retire a rider to Active"),
        };
        self.status
            .compare_exchange(
                STATUS_ACTIVE,
                target,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .unwrap_or_else(|prev| {
                panic!(
                    "rider {} retired twice (already in state {prev})",
                    self.id
                )
            });
    }
}
