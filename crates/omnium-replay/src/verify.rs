//! Cross-check live race results against the event stream.

use omnium_core::{FinalPlacement, RaceEvent};

use crate::error::ReplayError;
use crate::reconstruct::reconstruct_standings;

/// Verify that the standings reported by a live race match the
/// standings reconstructed from its event stream.
///
/// `live` must be ordered by rank, as the race report produces it. The
/// first disagreement is reported; an error from reconstruction itself
/// passes through unchanged.
pub fn verify(live: &[FinalPlacement], events: &[RaceEvent]) -> Result<(), ReplayError> {
    let replayed = reconstruct_standings(events)?;

    if live.len() != replayed.len() {
        return Err(ReplayError::LengthMismatch {
            live: live.len(),
            replayed: replayed.len(),
        });
    }
    for (l, r) in live.iter().zip(replayed.iter()) {
        if l.rider != r.rider || l.rank != r.rank {
            return Err(ReplayError::Divergence {
                rank: r.rank.0,
                live: l.rider,
                replayed: r.rider,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use omnium_core::{EventKind, Rank, RiderId, Tick};

    fn terminal(rider: u32, kind: EventKind, rank: u32) -> RaceEvent {
        RaceEvent {
            rider: RiderId(rider),
            number: rider + 1,
            kind,
            lap: 3,
            rank: Rank(rank),
            tick: Tick(rank as u64),
        }
    }

    fn placement(rider: u32, rank: u32) -> FinalPlacement {
        FinalPlacement {
            rider: RiderId(rider),
            number: rider + 1,
            rank: Rank(rank),
        }
    }

    fn stream() -> Vec<RaceEvent> {
        vec![
            terminal(2, EventKind::Eliminated, 3),
            terminal(1, EventKind::Broken, 2),
            terminal(0, EventKind::Finished, 1),
        ]
    }

    #[test]
    fn matching_results_verify() {
        let live = vec![placement(0, 1), placement(1, 2), placement(2, 3)];
        assert_eq!(verify(&live, &stream()), Ok(()));
    }

    #[test]
    fn diverging_rider_is_reported_at_its_rank() {
        let live = vec![placement(0, 1), placement(2, 2), placement(1, 3)];
        assert_eq!(
            verify(&live, &stream()),
            Err(ReplayError::Divergence {
                rank: 2,
                live: RiderId(2),
                replayed: RiderId(1),
            })
        );
    }

    #[test]
    fn missing_live_placement_is_a_length_mismatch() {
        let live = vec![placement(0, 1), placement(1, 2)];
        assert_eq!(
            verify(&live, &stream()),
            Err(ReplayError::LengthMismatch {
                live: 2,
                replayed: 3,
            })
        );
    }

    #[test]
    fn reconstruction_errors_pass_through() {
        let live = vec![placement(0, 1)];
        let events = vec![terminal(1, EventKind::Eliminated, 2)];
        assert_eq!(verify(&live, &events), Err(ReplayError::NoFinisher));
    }
}
