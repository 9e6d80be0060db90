//! Race timing: the start gate, the tick clock, and the chronometer
//! thread that paces rider workers.
//!
//! Two pacing regimes share this machinery. Under lockstep pacing every
//! rider performs exactly one step per chronometer tick, coordinated by
//! a reusable [`TickBarrier`]; under free-running pacing riders sleep on
//! their own and the chronometer only advances the clock and applies
//! rank compactions.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::Duration;

use omnium_core::{Pacing, Tick};

use crate::standings::Standings;

/// Minimum sleep between ticks, so a degenerate configuration never
/// turns the chronometer or a free-running rider into a busy loop.
pub(crate) const MIN_TICK_PERIOD: Duration = Duration::from_millis(1);

// ── Start gate ──────────────────────────────────────────────────────

#[derive(Clone, Copy, PartialEq, Eq)]
enum GateState {
    Closed,
    Open,
    Cancelled,
}

/// One-shot gate holding every rider at the line until the race opens,
/// or the start is called off before the gun.
pub struct StartGate {
    state: Mutex<GateState>,
    raised: Condvar,
}

impl StartGate {
    /// A closed gate.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(GateState::Closed),
            raised: Condvar::new(),
        }
    }

    /// Block until the gate resolves. Returns `true` when the race is
    /// on, `false` when the start was cancelled; in the latter case the
    /// caller exits without racing.
    pub fn wait(&self) -> bool {
        let mut state = self.state.lock().unwrap();
        while *state == GateState::Closed {
            state = self.raised.wait(state).unwrap();
        }
        *state == GateState::Open
    }

    /// Raise the gate, releasing every waiting rider at once.
    pub fn open(&self) {
        let mut state = self.state.lock().unwrap();
        if *state == GateState::Closed {
            *state = GateState::Open;
        }
        self.raised.notify_all();
    }

    /// Call the start off, turning every current and future waiter
    /// away. A no-op once the gate is already open.
    pub fn cancel(&self) {
        let mut state = self.state.lock().unwrap();
        if *state == GateState::Closed {
            *state = GateState::Cancelled;
        }
        self.raised.notify_all();
    }
}

impl Default for StartGate {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tick clock ──────────────────────────────────────────────────────

/// Monotonic race clock, advanced only by the chronometer and read by
/// riders when they stamp events.
pub struct TickClock {
    tick: AtomicU64,
}

impl TickClock {
    /// A clock at tick zero.
    pub fn new() -> Self {
        Self {
            tick: AtomicU64::new(0),
        }
    }

    /// The current tick.
    pub fn now(&self) -> Tick {
        Tick(self.tick.load(Ordering::Acquire))
    }

    /// Advance by one tick and return the new value.
    pub fn advance(&self) -> Tick {
        Tick(self.tick.fetch_add(1, Ordering::AcqRel) + 1)
    }
}

impl Default for TickClock {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tick barrier ────────────────────────────────────────────────────

struct BarrierState {
    /// Riders still participating in lockstep rounds.
    participants: usize,
    /// Participants that finished the current round.
    arrived: usize,
    /// Bumped on every release; riders wait for it to change.
    generation: u64,
    /// Set once the race is over; unblocks everyone permanently.
    closed: bool,
}

/// Reusable barrier coupling rider workers to the chronometer.
///
/// A round: each participant calls [`complete_and_wait`] after its
/// step; the chronometer observes the full round via
/// [`wait_all_arrived`], sleeps out the tick period, then starts the
/// next round with [`release_next`]. A rider that leaves the race calls
/// [`withdraw`] instead, shrinking the round size for everyone else.
///
/// [`complete_and_wait`]: TickBarrier::complete_and_wait
/// [`wait_all_arrived`]: TickBarrier::wait_all_arrived
/// [`release_next`]: TickBarrier::release_next
/// [`withdraw`]: TickBarrier::withdraw
pub struct TickBarrier {
    state: Mutex<BarrierState>,
    /// Signals riders: a new round has started (or the barrier closed).
    released: Condvar,
    /// Signals the chronometer: the round is complete.
    round_done: Condvar,
}

impl TickBarrier {
    /// Barrier for `participants` lockstep riders.
    pub fn new(participants: usize) -> Self {
        Self {
            state: Mutex::new(BarrierState {
                participants,
                arrived: 0,
                generation: 0,
                closed: false,
            }),
            released: Condvar::new(),
            round_done: Condvar::new(),
        }
    }

    /// Mark this rider's step done and block until the next round.
    ///
    /// Returns `false` if the barrier closed while waiting; the rider
    /// must exit its loop without calling [`withdraw`](Self::withdraw)
    /// (a closed barrier no longer counts participants).
    pub fn complete_and_wait(&self) -> bool {
        let mut state = self.state.lock().unwrap();
        if state.closed {
            return false;
        }
        state.arrived += 1;
        if state.arrived >= state.participants {
            self.round_done.notify_one();
        }
        let generation = state.generation;
        while state.generation == generation && !state.closed {
            state = self.released.wait(state).unwrap();
        }
        !state.closed
    }

    /// Permanently leave the barrier (elimination, breakdown, or win).
    ///
    /// Never called after [`complete_and_wait`](Self::complete_and_wait)
    /// returned `false` for this rider.
    pub fn withdraw(&self) {
        let mut state = self.state.lock().unwrap();
        if state.closed {
            return;
        }
        assert!(state.participants > 0, "withdraw from an empty barrier");
        state.participants -= 1;
        if state.arrived >= state.participants {
            self.round_done.notify_one();
        }
    }

    /// Chronometer side: block until every remaining participant has
    /// arrived. Returns the number of participants still in the race.
    pub fn wait_all_arrived(&self) -> usize {
        let mut state = self.state.lock().unwrap();
        while !state.closed && state.arrived < state.participants {
            state = self.round_done.wait(state).unwrap();
        }
        state.participants
    }

    /// Chronometer side: start the next round, waking all riders.
    pub fn release_next(&self) {
        let mut state = self.state.lock().unwrap();
        state.arrived = 0;
        state.generation += 1;
        self.released.notify_all();
    }

    /// Shut the barrier down; every current and future wait returns.
    pub fn close(&self) {
        let mut state = self.state.lock().unwrap();
        state.closed = true;
        self.released.notify_all();
        self.round_done.notify_all();
    }
}

// ── Chronometer ─────────────────────────────────────────────────────

/// The timing coordinator: advances the tick clock, paces lockstep
/// rounds, and applies pending rank compactions between ticks.
pub struct Chronometer {
    pacing: Pacing,
    tick_period: Duration,
    clock: Arc<TickClock>,
    barrier: Arc<TickBarrier>,
    standings: Arc<Standings>,
}

impl Chronometer {
    /// Build the chronometer for one race.
    pub fn new(
        pacing: Pacing,
        tick_period: Duration,
        clock: Arc<TickClock>,
        barrier: Arc<TickBarrier>,
        standings: Arc<Standings>,
    ) -> Self {
        Self {
            pacing,
            tick_period: tick_period.max(MIN_TICK_PERIOD),
            clock,
            barrier,
            standings,
        }
    }

    /// Run until the race resolves. Returns the final tick count.
    pub fn run(&self) -> Tick {
        match self.pacing {
            Pacing::Lockstep => self.run_lockstep(),
            Pacing::FreeRunning => self.run_free(),
        }
    }

    /// Lockstep: one rider step per rider per tick. Compactions are
    /// applied at the quiescent point between rounds, when no rider is
    /// mid-move.
    fn run_lockstep(&self) -> Tick {
        loop {
            let remaining = self.barrier.wait_all_arrived();
            self.standings.apply_compaction();
            let tick = self.clock.advance();
            if remaining <= 1 {
                self.barrier.close();
                return tick;
            }
            thread::sleep(self.tick_period);
            self.barrier.release_next();
        }
    }

    /// Free-running: riders pace themselves; the chronometer only keeps
    /// the clock moving and folds in compactions until one rider is
    /// left.
    fn run_free(&self) -> Tick {
        loop {
            thread::sleep(self.tick_period);
            self.standings.apply_compaction();
            let tick = self.clock.advance();
            if self.standings.active_count() <= 1 {
                self.barrier.close();
                return tick;
            }
        }
    }
}
