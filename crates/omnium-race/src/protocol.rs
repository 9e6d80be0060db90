//! The movement protocol: one worker thread per rider.
//!
//! Each tick a worker performs at most one cell transition, in three
//! phases with a fixed lock order:
//!
//! 1. **Admission** — reserve a capacity slot in the destination cell
//!    (non-blocking under lockstep pacing: a full cell means the rider
//!    stays put this tick).
//! 2. **Destination phase** — under the destination's structural lock,
//!    run the finish-line rules if the destination is cell 0, then
//!    register the rider if it survived them.
//! 3. **Origin phase** — under the origin's structural lock, resolve
//!    overtakes against the riders left behind, then deregister and
//!    release the origin slot.
//!
//! The destination guard is always dropped before the origin guard is
//! taken, and the standings mutex is only ever taken inside a single
//! cell-lock scope, so no lock cycle exists. Events are published after
//! all locks are released.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rand_chacha::ChaCha8Rng;

use omnium_core::{CellIndex, EventKind, Pacing, RaceEvent, Rank};
use omnium_track::Track;

use crate::chronometer::{StartGate, TickBarrier, TickClock};
use crate::egress::EventSink;
use crate::metrics::MetricsRecorder;
use crate::referee::{LapVerdict, Referee};
use crate::rider::{Rider, SpeedClass};
use crate::standings::Standings;

/// Worker state for one rider. Position, half-step flag, speed class,
/// and the RNG are owned here and never shared.
pub struct RiderWorker {
    pub(crate) rider: Arc<Rider>,
    pub(crate) riders: Arc<Vec<Arc<Rider>>>,
    pub(crate) track: Arc<Track>,
    pub(crate) standings: Arc<Standings>,
    pub(crate) referee: Arc<Referee>,
    pub(crate) gate: Arc<StartGate>,
    pub(crate) barrier: Arc<TickBarrier>,
    pub(crate) clock: Arc<TickClock>,
    pub(crate) sink: EventSink,
    pub(crate) metrics: Arc<MetricsRecorder>,
    pub(crate) pacing: Pacing,
    pub(crate) tick_period: Duration,
    pub(crate) rng: ChaCha8Rng,
    pub(crate) position: CellIndex,
    pub(crate) speed: SpeedClass,
    pub(crate) half: bool,
}

impl RiderWorker {
    /// Run the rider to its terminal state: eliminated, broken, or the
    /// last one standing.
    pub fn run(mut self) {
        if !self.gate.wait() {
            return;
        }
        loop {
            self.step();

            let racing = self.rider.is_active();
            let last_one = self.standings.active_count() <= 1;
            match self.pacing {
                Pacing::Lockstep => {
                    if !racing || last_one {
                        self.barrier.withdraw();
                        break;
                    }
                    if !self.barrier.complete_and_wait() {
                        break;
                    }
                }
                Pacing::FreeRunning => {
                    if !racing || last_one {
                        break;
                    }
                    thread::sleep(self.tick_period);
                }
            }
        }

        if self.rider.is_active() {
            let rank = self.standings.finalize_winner(self.rider.id);
            self.emit(EventKind::Finished, rank);
        }
    }

    /// One tick's worth of movement for this rider.
    fn step(&mut self) {
        let displacement = self.speed.displacement(self.half);
        self.half = !self.half;
        if displacement == 0 {
            self.stationary_tick();
            return;
        }

        let origin = self.position;
        let destination = origin.next(self.track.len());

        let admitted = match self.pacing {
            Pacing::Lockstep => self.track.try_enter(destination),
            Pacing::FreeRunning => {
                self.track.enter(destination);
                true
            }
        };
        if !admitted {
            self.metrics.record_blocked_move();
            self.stationary_tick();
            return;
        }

        // Destination phase.
        let mut verdict = LapVerdict::Continue;
        {
            let mut guard = self.track.lock_cell(destination);
            if destination.is_finish_line() {
                verdict =
                    self.referee
                        .lap_completed(&self.standings, &self.rider, &mut self.rng);
            }
            if verdict == LapVerdict::Continue {
                guard.register(self.rider.id);
            }
        }
        let survived = verdict == LapVerdict::Continue;
        if !survived {
            // The reserved slot was never occupied.
            self.track.leave(destination);
        }

        // Origin phase.
        let swaps = {
            let mut guard = self.track.lock_cell(origin);
            let swaps = if survived {
                self.referee.resolve_overtakes(
                    &self.standings,
                    &self.rider,
                    guard.occupants(),
                    &self.riders,
                )
            } else {
                0
            };
            guard.deregister(self.rider.id);
            swaps
        };
        self.track.leave(origin);
        self.metrics.record_overtakes(swaps);

        if survived {
            self.position = destination;
            self.metrics.record_move();
            if destination.is_finish_line() {
                self.metrics.record_lap_completion();
                let rank = self.standings.rank_of(self.rider.id);
                self.emit(EventKind::LapComplete, rank);
                if let Some(speed) = self.referee.reroll_speed(&mut self.rng) {
                    self.speed = speed;
                }
            } else {
                let rank = self.standings.rank_of(self.rider.id);
                self.emit(EventKind::Move, rank);
            }
        } else {
            match verdict {
                LapVerdict::Eliminated(rank) => {
                    self.metrics.record_elimination();
                    self.emit(EventKind::Eliminated, rank);
                }
                LapVerdict::Broken(rank) => {
                    self.metrics.record_breakdown();
                    self.emit(EventKind::Broken, rank);
                }
                LapVerdict::Continue => unreachable!(),
            }
        }
    }

    /// A tick spent parked: the slow-class half-step, or a move refused
    /// by a full destination. No occupancy changes, but a pending
    /// breakdown target can still fire against this rider's rank.
    fn stationary_tick(&mut self) {
        let broken =
            self.referee
                .stationary_checks(&self.standings, &self.rider, &mut self.rng);
        if let Some(rank) = broken {
            let origin = self.position;
            self.track.lock_cell(origin).deregister(self.rider.id);
            self.track.leave(origin);
            self.metrics.record_breakdown();
            self.emit(EventKind::Broken, rank);
        }
    }

    fn emit(&self, kind: EventKind, rank: Rank) {
        self.sink.publish(RaceEvent {
            rider: self.rider.id,
            number: self.rider.number,
            kind,
            lap: self.rider.lap(),
            rank,
            tick: self.clock.now(),
        });
    }
}
