//! Rebuild the final standings from a captured event stream.

use indexmap::IndexMap;

use omnium_core::{EventKind, FinalPlacement, RaceEvent, RiderId};

use crate::error::ReplayError;

/// Reconstruct every rider's final placement from the event stream.
///
/// Only terminal events (`Eliminated`, `Broken`, `Finished`) assign
/// placements; `Move` and `LapComplete` events are used for per-rider
/// consistency checks. The stream is validated as it is folded:
/// exactly one finisher at rank 1, one terminal event per rider, laps
/// non-decreasing per rider, and final ranks forming the contiguous
/// range `1..=n`.
pub fn reconstruct_standings(
    events: &[RaceEvent],
) -> Result<Vec<FinalPlacement>, ReplayError> {
    // Insertion-ordered so error reporting names the earlier claimant.
    let mut terminal: IndexMap<RiderId, FinalPlacement> = IndexMap::new();
    let mut last_lap: IndexMap<RiderId, u32> = IndexMap::new();
    let mut finisher: Option<RiderId> = None;

    for event in events {
        if let Some(&previous) = last_lap.get(&event.rider) {
            if event.lap < previous {
                return Err(ReplayError::LapRegression {
                    rider: event.rider,
                    from: previous,
                    to: event.lap,
                });
            }
        }
        last_lap.insert(event.rider, event.lap);

        if !event.kind.is_terminal() {
            continue;
        }
        if terminal.contains_key(&event.rider) {
            return Err(ReplayError::DuplicateTerminal { rider: event.rider });
        }
        if event.kind == EventKind::Finished {
            if let Some(first) = finisher {
                return Err(ReplayError::MultipleFinishers {
                    first,
                    second: event.rider,
                });
            }
            if event.rank.0 != 1 {
                return Err(ReplayError::WinnerNotFirst {
                    found: event.rank.0,
                });
            }
            finisher = Some(event.rider);
        }
        terminal.insert(
            event.rider,
            FinalPlacement {
                rider: event.rider,
                number: event.number,
                rank: event.rank,
            },
        );
    }

    if finisher.is_none() {
        return Err(ReplayError::NoFinisher);
    }

    let mut placements: Vec<FinalPlacement> = terminal.values().cloned().collect();
    placements.sort_by_key(|p| (p.rank.0, p.rider.0));

    for window in placements.windows(2) {
        if window[0].rank == window[1].rank {
            return Err(ReplayError::DuplicateRank {
                rank: window[0].rank.0,
                first: window[0].rider,
                second: window[1].rider,
            });
        }
    }
    for (i, placement) in placements.iter().enumerate() {
        let expected = i as u32 + 1;
        if placement.rank.0 != expected {
            return Err(ReplayError::RankGap {
                expected,
                found: placement.rank.0,
            });
        }
    }

    Ok(placements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use omnium_core::{Rank, Tick};
    use proptest::prelude::*;

    fn ev(rider: u32, kind: EventKind, lap: u32, rank: u32, tick: u64) -> RaceEvent {
        RaceEvent {
            rider: RiderId(rider),
            number: rider + 1,
            kind,
            lap,
            rank: Rank(rank),
            tick: Tick(tick),
        }
    }

    #[test]
    fn clean_stream_reconstructs_in_rank_order() {
        let events = vec![
            ev(0, EventKind::Move, 1, 1, 0),
            ev(3, EventKind::Eliminated, 2, 4, 1),
            ev(1, EventKind::LapComplete, 2, 2, 3),
            ev(2, EventKind::Eliminated, 3, 3, 5),
            ev(1, EventKind::Broken, 3, 2, 6),
            ev(0, EventKind::Finished, 4, 1, 7),
        ];
        let placements = reconstruct_standings(&events).unwrap();
        let order: Vec<u32> = placements.iter().map(|p| p.rider.0).collect();
        assert_eq!(order, vec![0, 1, 2, 3]);
        assert_eq!(placements[0].rank, Rank(1));
        assert_eq!(placements[3].rank, Rank(4));
    }

    #[test]
    fn missing_finisher_is_an_error() {
        let events = vec![ev(3, EventKind::Eliminated, 2, 4, 1)];
        assert_eq!(reconstruct_standings(&events), Err(ReplayError::NoFinisher));
    }

    #[test]
    fn two_finishers_are_rejected() {
        let events = vec![
            ev(0, EventKind::Finished, 4, 1, 7),
            ev(1, EventKind::Finished, 4, 1, 8),
        ];
        assert_eq!(
            reconstruct_standings(&events),
            Err(ReplayError::MultipleFinishers {
                first: RiderId(0),
                second: RiderId(1),
            })
        );
    }

    #[test]
    fn winner_must_carry_rank_one() {
        let events = vec![ev(0, EventKind::Finished, 4, 2, 7)];
        assert_eq!(
            reconstruct_standings(&events),
            Err(ReplayError::WinnerNotFirst { found: 2 })
        );
    }

    #[test]
    fn second_terminal_event_for_one_rider_is_rejected() {
        let events = vec![
            ev(2, EventKind::Broken, 3, 3, 5),
            ev(2, EventKind::Eliminated, 3, 3, 6),
        ];
        assert_eq!(
            reconstruct_standings(&events),
            Err(ReplayError::DuplicateTerminal { rider: RiderId(2) })
        );
    }

    #[test]
    fn duplicate_final_ranks_are_rejected() {
        let events = vec![
            ev(0, EventKind::Finished, 4, 1, 7),
            ev(1, EventKind::Eliminated, 2, 2, 1),
            ev(2, EventKind::Eliminated, 3, 2, 3),
        ];
        assert_eq!(
            reconstruct_standings(&events),
            Err(ReplayError::DuplicateRank {
                rank: 2,
                first: RiderId(1),
                second: RiderId(2),
            })
        );
    }

    #[test]
    fn gapped_final_ranks_are_rejected() {
        let events = vec![
            ev(0, EventKind::Finished, 4, 1, 7),
            ev(2, EventKind::Eliminated, 3, 3, 3),
        ];
        assert_eq!(
            reconstruct_standings(&events),
            Err(ReplayError::RankGap {
                expected: 2,
                found: 3,
            })
        );
    }

    #[test]
    fn lap_regression_is_rejected() {
        let events = vec![
            ev(1, EventKind::LapComplete, 3, 2, 3),
            ev(1, EventKind::Move, 2, 2, 4),
        ];
        assert_eq!(
            reconstruct_standings(&events),
            Err(ReplayError::LapRegression {
                rider: RiderId(1),
                from: 3,
                to: 2,
            })
        );
    }

    proptest! {
        /// Terminal events reconstruct to rank order no matter what
        /// order the stream delivered them in.
        #[test]
        fn any_terminal_order_reconstructs_rank_order(
            order in (2usize..12).prop_flat_map(|n| {
                Just((1..=n as u32).collect::<Vec<u32>>()).prop_shuffle()
            })
        ) {
            let events: Vec<RaceEvent> = order
                .iter()
                .map(|&rank| {
                    let kind = if rank == 1 {
                        EventKind::Finished
                    } else if rank % 2 == 0 {
                        EventKind::Eliminated
                    } else {
                        EventKind::Broken
                    };
                    ev(rank - 1, kind, rank, rank, u64::from(rank))
                })
                .collect();

            let placements = reconstruct_standings(&events).unwrap();
            prop_assert_eq!(placements.len(), order.len());
            for (i, placement) in placements.iter().enumerate() {
                prop_assert_eq!(placement.rank.0, i as u32 + 1);
            }
        }
    }
}
