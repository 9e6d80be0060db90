//! A single track cell: permit pool plus occupant set.

use std::sync::{Condvar, Mutex};

use omnium_core::{RiderId, CELL_CAPACITY};
use smallvec::SmallVec;

/// Occupant set of one cell. Inline capacity matches the admission
/// bound, so occupant lists never spill to the heap.
pub(crate) type Occupants = SmallVec<[RiderId; CELL_CAPACITY]>;

/// A counting permit pool: a condvar-based semaphore.
///
/// Replaces the busy-wait "is the cell full?" polling of ad-hoc
/// implementations. [`acquire`](PermitPool::acquire) parks the caller on
/// a condition variable until a permit frees up; there is no spinning.
/// No fairness is promised — any blocked rider may win a freed permit —
/// and correctness does not depend on arrival order, only on the
/// capacity bound.
pub struct PermitPool {
    capacity: usize,
    available: Mutex<usize>,
    freed: Condvar,
}

impl PermitPool {
    /// Create a pool holding `capacity` permits.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            available: Mutex::new(capacity),
            freed: Condvar::new(),
        }
    }

    /// Block until a permit is available, then take it.
    pub fn acquire(&self) {
        let mut available = self.available.lock().unwrap();
        while *available == 0 {
            available = self.freed.wait(available).unwrap();
        }
        *available -= 1;
    }

    /// Take a permit if one is available without blocking.
    ///
    /// Returns `false` when the pool is exhausted.
    pub fn try_acquire(&self) -> bool {
        let mut available = self.available.lock().unwrap();
        if *available == 0 {
            return false;
        }
        *available -= 1;
        true
    }

    /// Return a previously acquired permit.
    ///
    /// # Panics
    ///
    /// Panics if more permits are released than were ever acquired —
    /// the accounting equivalent of negative occupancy, a fatal
    /// consistency violation.
    pub fn release(&self) {
        let mut available = self.available.lock().unwrap();
        assert!(
            *available < self.capacity,
            "permit released into a full pool (capacity {})",
            self.capacity
        );
        *available += 1;
        self.freed.notify_one();
    }

    /// Permits currently available.
    pub fn available(&self) -> usize {
        *self.available.lock().unwrap()
    }
}

/// One discrete position on the circular track.
///
/// Holds up to [`CELL_CAPACITY`] occupants. The permit pool bounds
/// admission; the occupant set records *which* riders are present and is
/// mutated only under the cell's structural lock via
/// [`Track::lock_cell`](crate::Track::lock_cell).
pub struct Cell {
    pub(crate) permits: PermitPool,
    pub(crate) occupants: Mutex<Occupants>,
}

impl Cell {
    pub(crate) fn new() -> Self {
        Self {
            permits: PermitPool::new(CELL_CAPACITY),
            occupants: Mutex::new(Occupants::new()),
        }
    }

    /// Number of riders currently registered in this cell.
    pub fn occupancy(&self) -> usize {
        self.occupants.lock().unwrap().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn permits_start_at_capacity() {
        let pool = PermitPool::new(4);
        assert_eq!(pool.available(), 4);
    }

    #[test]
    fn acquire_release_round_trip() {
        let pool = PermitPool::new(4);
        pool.acquire();
        pool.acquire();
        assert_eq!(pool.available(), 2);
        pool.release();
        assert_eq!(pool.available(), 3);
    }

    #[test]
    fn try_acquire_fails_when_exhausted() {
        let pool = PermitPool::new(2);
        assert!(pool.try_acquire());
        assert!(pool.try_acquire());
        assert!(!pool.try_acquire());
        pool.release();
        assert!(pool.try_acquire());
    }

    #[test]
    #[should_panic(expected = "permit released into a full pool")]
    fn release_beyond_capacity_panics() {
        let pool = PermitPool::new(2);
        pool.release();
    }

    #[test]
    fn acquire_blocks_until_release() {
        let pool = Arc::new(PermitPool::new(1));
        pool.acquire();

        let waiter = {
            let pool = Arc::clone(&pool);
            thread::spawn(move || {
                pool.acquire();
            })
        };

        // The waiter should be parked, not spinning to completion.
        thread::sleep(Duration::from_millis(20));
        assert!(!waiter.is_finished());

        pool.release();
        waiter.join().unwrap();
        assert_eq!(pool.available(), 0);
    }

    #[test]
    fn new_cell_is_empty() {
        let cell = Cell::new();
        assert_eq!(cell.occupancy(), 0);
        assert_eq!(cell.permits.available(), CELL_CAPACITY);
    }
}
