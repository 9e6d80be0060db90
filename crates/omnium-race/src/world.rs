//! Race orchestration: build the world from a configuration, spawn the
//! rider workers and the chronometer, and collect the final report.

use std::sync::Arc;
use std::thread;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use omnium_core::{
    CellIndex, ConfigError, FinalPlacement, RaceConfig, RaceMode, RiderId,
};
use omnium_track::Track;

use crate::chronometer::{Chronometer, StartGate, TickBarrier, TickClock, MIN_TICK_PERIOD};
use crate::egress::{event_channel, EventSink, EventStream};
use crate::metrics::{MetricsRecorder, RaceMetrics};
use crate::protocol::RiderWorker;
use crate::referee::Referee;
use crate::rider::{Rider, SpeedClass};
use crate::standings::Standings;

/// Odd multiplier decorrelating per-rider RNG streams derived from the
/// race seed.
const STREAM_SALT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Outcome of a completed race.
#[derive(Clone, Debug)]
pub struct RaceReport {
    /// The rider that finished at rank 1.
    pub winner: FinalPlacement,
    /// Every rider's final placement, ordered by rank.
    pub standings: Vec<FinalPlacement>,
    /// Chronometer ticks from gate to finish.
    pub ticks: u64,
    /// Cumulative race counters.
    pub metrics: RaceMetrics,
}

/// A fully built race, ready to run.
///
/// Construction validates the configuration and lays the grid out;
/// [`run`](RaceWorld::run) consumes the world, drives it to completion,
/// and returns the [`RaceReport`]. The paired [`EventStream`] from
/// [`RaceWorld::new`] observes the race live and closes when the last
/// worker exits.
pub struct RaceWorld {
    config: RaceConfig,
    track: Arc<Track>,
    riders: Arc<Vec<Arc<Rider>>>,
    standings: Arc<Standings>,
    referee: Arc<Referee>,
    gate: Arc<StartGate>,
    barrier: Arc<TickBarrier>,
    clock: Arc<TickClock>,
    metrics: Arc<MetricsRecorder>,
    sink: EventSink,
    seed: u64,
}

impl RaceWorld {
    /// Validate `config` and lay out the starting grid.
    ///
    /// Shirt numbers are a seeded random permutation of `1..=n`; rider
    /// `k` starts in cell `(k * spacing + 1) % track_length` holding
    /// initial rank `n - k`, so the grid runs from the back of the
    /// field forward and the initial leader starts nearest the line.
    pub fn new(config: RaceConfig) -> Result<(Self, EventStream), ConfigError> {
        config.validate()?;
        let n = config.rider_count;
        let track_length = config.track_length;

        let mut seed_rng = ChaCha8Rng::seed_from_u64(config.seed);
        let mut numbers: Vec<u32> = (1..=n as u32).collect();
        numbers.shuffle(&mut seed_rng);

        let track = Arc::new(Track::new(track_length));
        let spacing = track_length / n;
        let mut riders = Vec::with_capacity(n);
        for (k, &number) in numbers.iter().enumerate() {
            let rider = Arc::new(Rider::new(RiderId(k as u32), number));
            let cell = CellIndex((k * spacing + 1) % track_length);
            track.place_at_start(cell, rider.id);
            riders.push(rider);
        }
        let initial_ranks: Vec<u32> = (0..n as u32).map(|k| n as u32 - k).collect();

        let (sink, stream) = event_channel();
        let world = Self {
            track,
            riders: Arc::new(riders),
            standings: Arc::new(Standings::new(initial_ranks)),
            referee: Arc::new(Referee::new(config.mode)),
            gate: Arc::new(StartGate::new()),
            barrier: Arc::new(TickBarrier::new(n)),
            clock: Arc::new(TickClock::new()),
            metrics: Arc::new(MetricsRecorder::new()),
            sink,
            seed: config.seed,
            config,
        };
        Ok((world, stream))
    }

    /// Riders in slot order, for inspection before the race starts.
    pub fn riders(&self) -> &[Arc<Rider>] {
        &self.riders
    }

    /// Run the race to completion.
    ///
    /// Spawns one worker thread per rider plus the chronometer, opens
    /// the start gate, and joins everything before assembling the
    /// report.
    pub fn run(self) -> Result<RaceReport, ConfigError> {
        let mut workers = Vec::with_capacity(self.riders.len());
        for (k, rider) in self.riders.iter().enumerate() {
            let worker = self.worker_for(k, rider);
            let spawned = thread::Builder::new()
                .name(format!("rider-{:02}", rider.number))
                .spawn(move || worker.run());
            match spawned {
                Ok(handle) => workers.push(handle),
                Err(e) => return Err(self.abort_start(workers, e)),
            }
        }

        let chronometer = Chronometer::new(
            self.config.pacing,
            self.config.tick_period,
            Arc::clone(&self.clock),
            Arc::clone(&self.barrier),
            Arc::clone(&self.standings),
        );
        let timer = match thread::Builder::new()
            .name("chronometer".into())
            .spawn(move || chronometer.run())
        {
            Ok(handle) => handle,
            Err(e) => return Err(self.abort_start(workers, e)),
        };

        self.gate.open();
        for handle in workers {
            handle.join().expect("rider worker panicked");
        }
        let final_tick = timer.join().expect("chronometer panicked");

        // Close the event stream.
        drop(self.sink);

        let mut standings: Vec<FinalPlacement> = self
            .standings
            .final_ranks()
            .iter()
            .enumerate()
            .map(|(slot, rank)| FinalPlacement {
                rider: RiderId(slot as u32),
                number: self.riders[slot].number,
                rank: rank.expect("rider finished without a placement"),
            })
            .collect();
        standings.sort_by_key(|p| p.rank.0);
        let winner = standings[0].clone();

        Ok(RaceReport {
            winner,
            standings,
            ticks: final_tick.0,
            metrics: self.metrics.snapshot(final_tick.0),
        })
    }

    /// A spawn failed mid-start: cancel the gate so every rider already
    /// spawned exits instead of parking forever, join them, and report
    /// the failure.
    fn abort_start(
        &self,
        workers: Vec<thread::JoinHandle<()>>,
        error: std::io::Error,
    ) -> ConfigError {
        self.gate.cancel();
        for handle in workers {
            handle.join().expect("rider worker panicked");
        }
        ConfigError::ThreadSpawnFailed {
            reason: error.to_string(),
        }
    }

    fn worker_for(&self, slot: usize, rider: &Arc<Rider>) -> RiderWorker {
        let stream_seed = self.seed ^ (slot as u64 + 1).wrapping_mul(STREAM_SALT);
        let rng = ChaCha8Rng::seed_from_u64(stream_seed);
        let speed = match self.config.mode {
            RaceMode::Uniform => SpeedClass::Fast,
            RaceMode::Variable => SpeedClass::Slow,
        };
        let spacing = self.config.track_length / self.riders.len();
        RiderWorker {
            rider: Arc::clone(rider),
            riders: Arc::clone(&self.riders),
            track: Arc::clone(&self.track),
            standings: Arc::clone(&self.standings),
            referee: Arc::clone(&self.referee),
            gate: Arc::clone(&self.gate),
            barrier: Arc::clone(&self.barrier),
            clock: Arc::clone(&self.clock),
            sink: self.sink.clone(),
            metrics: Arc::clone(&self.metrics),
            pacing: self.config.pacing,
            // Same floor as the chronometer: a zero-period config must
            // not busy-step free-running riders either.
            tick_period: self.config.tick_period.max(MIN_TICK_PERIOD),
            rng,
            position: CellIndex((slot * spacing + 1) % self.config.track_length),
            speed,
            half: false,
        }
    }
}
