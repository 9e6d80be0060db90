//! The circular track: a fixed ring of capacity-bounded cells.

use std::sync::MutexGuard;

use omnium_core::{CellIndex, RiderId, CELL_CAPACITY};

use crate::cell::{Cell, Occupants};

/// Fixed-size circular array of cells. Cell index 0 is the finish line.
///
/// `Track` exposes admission control (`enter`/`try_enter`/`leave`) and
/// scoped structural access ([`lock_cell`](Track::lock_cell)) separately,
/// because the movement protocol reserves capacity *before* it mutates
/// occupant identity and releases it *after*.
pub struct Track {
    cells: Box<[Cell]>,
}

impl Track {
    /// Build a track of `track_length` empty cells.
    ///
    /// # Panics
    ///
    /// Panics if `track_length` is zero; configuration validation
    /// rejects such tracks long before a `Track` is built.
    pub fn new(track_length: usize) -> Self {
        assert!(track_length > 0, "track must have at least one cell");
        let cells = (0..track_length).map(|_| Cell::new()).collect();
        Self { cells }
    }

    /// Number of cells in the ring.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the track has zero cells. Always `false` for a
    /// constructed track; present for API completeness.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn cell(&self, index: CellIndex) -> &Cell {
        &self.cells[index.0]
    }

    /// Block until `index` has spare capacity, then reserve one slot.
    pub fn enter(&self, index: CellIndex) {
        self.cell(index).permits.acquire();
    }

    /// Reserve a slot in `index` if one is free, without blocking.
    pub fn try_enter(&self, index: CellIndex) -> bool {
        self.cell(index).permits.try_acquire()
    }

    /// Release a previously reserved slot in `index`.
    pub fn leave(&self, index: CellIndex) {
        self.cell(index).permits.release();
    }

    /// Take the structural lock of `index` for occupant-set mutation.
    ///
    /// Callers must respect the global lock order: a destination cell's
    /// guard is always dropped before the origin cell's guard is taken.
    pub fn lock_cell(&self, index: CellIndex) -> CellGuard<'_> {
        CellGuard {
            index,
            occupants: self.cell(index).occupants.lock().unwrap(),
        }
    }

    /// Occupancy of a single cell (takes and drops the structural lock).
    pub fn occupancy(&self, index: CellIndex) -> usize {
        self.cell(index).occupancy()
    }

    /// Sum of occupancy across all cells.
    ///
    /// Equals the active-rider count at every quiescent point (no rider
    /// mid-move). Not a consistent snapshot while riders are in flight.
    pub fn total_occupancy(&self) -> usize {
        self.cells.iter().map(Cell::occupancy).sum()
    }

    /// Place a rider in its starting cell: reserve a permit and register.
    ///
    /// Used only during race setup, when no contention exists; the
    /// permit accounting must match later `leave()` calls exactly.
    pub fn place_at_start(&self, index: CellIndex, rider: RiderId) {
        self.enter(index);
        self.lock_cell(index).register(rider);
    }
}

/// Scoped access to one cell's occupant set, held under the cell's
/// structural lock.
///
/// Registration invariants are enforced here so that no caller can
/// produce an occupancy outside `[0, CELL_CAPACITY]` without tripping a
/// fatal assertion.
pub struct CellGuard<'a> {
    index: CellIndex,
    occupants: MutexGuard<'a, Occupants>,
}

impl CellGuard<'_> {
    /// The cell this guard locks.
    pub fn index(&self) -> CellIndex {
        self.index
    }

    /// Riders currently registered in the cell.
    pub fn occupants(&self) -> &[RiderId] {
        &self.occupants
    }

    /// Record `rider` as an occupant.
    ///
    /// # Panics
    ///
    /// Panics on a fifth occupant or a duplicate registration; both
    /// indicate a synchronization bug, not a recoverable condition.
    pub fn register(&mut self, rider: RiderId) {
        assert!(
            self.occupants.len() < CELL_CAPACITY,
            "more than {CELL_CAPACITY} riders in cell {}",
            self.index
        );
        assert!(
            !self.occupants.contains(&rider),
            "rider {rider} registered twice in cell {}",
            self.index
        );
        self.occupants.push(rider);
    }

    /// Remove `rider` from the occupant set.
    ///
    /// # Panics
    ///
    /// Panics if the rider is not present — the identity-bookkeeping
    /// equivalent of negative occupancy.
    pub fn deregister(&mut self, rider: RiderId) {
        let before = self.occupants.len();
        self.occupants.retain(|r| *r != rider);
        assert_eq!(
            self.occupants.len() + 1,
            before,
            "rider {rider} missing from cell {}",
            self.index
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn new_track_is_all_empty() {
        let track = Track::new(16);
        assert_eq!(track.len(), 16);
        assert_eq!(track.total_occupancy(), 0);
    }

    #[test]
    fn register_and_deregister_round_trip() {
        let track = Track::new(8);
        let cell = CellIndex(3);
        track.enter(cell);
        track.lock_cell(cell).register(RiderId(1));
        assert_eq!(track.occupancy(cell), 1);

        track.lock_cell(cell).deregister(RiderId(1));
        track.leave(cell);
        assert_eq!(track.occupancy(cell), 0);
    }

    #[test]
    fn try_enter_respects_capacity() {
        let track = Track::new(8);
        let cell = CellIndex(0);
        for _ in 0..CELL_CAPACITY {
            assert!(track.try_enter(cell));
        }
        assert!(!track.try_enter(cell));
        track.leave(cell);
        assert!(track.try_enter(cell));
    }

    #[test]
    #[should_panic(expected = "more than 4 riders")]
    fn fifth_occupant_panics() {
        let track = Track::new(8);
        let mut guard = track.lock_cell(CellIndex(2));
        for i in 0..5 {
            guard.register(RiderId(i));
        }
    }

    #[test]
    #[should_panic(expected = "registered twice")]
    fn duplicate_registration_panics() {
        let track = Track::new(8);
        let mut guard = track.lock_cell(CellIndex(2));
        guard.register(RiderId(9));
        guard.register(RiderId(9));
    }

    #[test]
    #[should_panic(expected = "missing from cell")]
    fn deregistering_absent_rider_panics() {
        let track = Track::new(8);
        track.lock_cell(CellIndex(1)).deregister(RiderId(0));
    }

    #[test]
    fn place_at_start_reserves_a_permit() {
        let track = Track::new(8);
        let cell = CellIndex(5);
        track.place_at_start(cell, RiderId(0));
        assert_eq!(track.occupancy(cell), 1);
        // Three permits remain.
        for _ in 0..CELL_CAPACITY - 1 {
            assert!(track.try_enter(cell));
        }
        assert!(!track.try_enter(cell));
    }

    /// Many threads hammering one cell never exceed the capacity bound.
    #[test]
    fn concurrent_admission_never_exceeds_capacity() {
        let track = Arc::new(Track::new(4));
        let cell = CellIndex(1);

        let handles: Vec<_> = (0..16u32)
            .map(|i| {
                let track = Arc::clone(&track);
                thread::spawn(move || {
                    for _ in 0..200 {
                        track.enter(cell);
                        track.lock_cell(cell).register(RiderId(i));
                        // Occupancy is checked by register() itself; also
                        // observe it while we hold a slot.
                        assert!(track.occupancy(cell) <= CELL_CAPACITY);
                        track.lock_cell(cell).deregister(RiderId(i));
                        track.leave(cell);
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(track.occupancy(cell), 0);
    }

    proptest! {
        /// Any interleaving of register/deregister pairs leaves the
        /// cell occupancy in [0, CELL_CAPACITY] and ends empty.
        #[test]
        fn occupancy_stays_in_bounds(orders in proptest::collection::vec(0..4usize, 1..64)) {
            let track = Track::new(4);
            let cell = CellIndex(2);
            let mut inside: Vec<RiderId> = Vec::new();
            let mut next = 0u32;

            for op in orders {
                // Even ops admit (when room), odd ops evict (when occupied).
                if op % 2 == 0 && inside.len() < CELL_CAPACITY {
                    let rider = RiderId(next);
                    next += 1;
                    prop_assert!(track.try_enter(cell));
                    track.lock_cell(cell).register(rider);
                    inside.push(rider);
                } else if let Some(rider) = inside.pop() {
                    track.lock_cell(cell).deregister(rider);
                    track.leave(cell);
                }
                prop_assert!(track.occupancy(cell) <= CELL_CAPACITY);
                prop_assert_eq!(track.occupancy(cell), inside.len());
            }

            for rider in inside.drain(..) {
                track.lock_cell(cell).deregister(rider);
                track.leave(cell);
            }
            prop_assert_eq!(track.occupancy(cell), 0);
        }
    }
}
