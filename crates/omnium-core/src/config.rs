//! Race configuration and validation.
//!
//! [`RaceConfig`] is the builder-input for constructing a race.
//! [`validate()`](RaceConfig::validate) rejects malformed setups before
//! any worker thread is spawned; past that point the only failures the
//! simulator recognizes are fatal synchronization bugs.

use std::time::Duration;

use crate::error::ConfigError;

/// Maximum concurrent occupants of a single track cell.
///
/// Matches the physical-lane abstraction of the simulated velodrome.
/// Exceeding this bound is a fatal consistency violation, never a
/// recoverable error.
pub const CELL_CAPACITY: usize = 4;

/// Minimum number of riders for a meaningful omnium.
pub const MIN_RIDERS: usize = 4;

/// Minimum track length in cells.
pub const MIN_TRACK_LENGTH: usize = 8;

/// Speed-class assignment policy for the race.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RaceMode {
    /// Every rider races in the fast class for the whole race.
    Uniform,
    /// Riders start in the slow class and re-roll their speed class
    /// uniformly on every lap completion.
    Variable,
}

/// Tick pacing discipline for the rider workers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pacing {
    /// All riders rendezvous at a tick barrier; no tick starts until every
    /// racing rider has completed its previous movement. A rider facing a
    /// full destination cell stays put for the tick rather than blocking
    /// the barrier.
    Lockstep,
    /// Riders pace themselves on the tick period and block on destination
    /// admission capacity when a cell is full.
    FreeRunning,
}

/// Complete configuration for a single race.
///
/// Construct with [`RaceConfig::new`] and adjust the remaining fields
/// directly, then pass to the race world which calls
/// [`validate()`](RaceConfig::validate) before spawning any workers.
#[derive(Clone, Debug)]
pub struct RaceConfig {
    /// Number of cells in the circular track. Cell 0 is the finish line.
    pub track_length: usize,
    /// Number of competitors.
    pub rider_count: usize,
    /// Speed-class assignment policy.
    pub mode: RaceMode,
    /// Tick pacing discipline. Default: [`Pacing::Lockstep`].
    pub pacing: Pacing,
    /// Wall-clock duration of one simulated tick. Default: 72ms, the
    /// cycle time of the original velodrome simulation. Tests run with
    /// a zero period.
    pub tick_period: Duration,
    /// Seed for the starting-order permutation and all stochastic rules.
    pub seed: u64,
}

impl RaceConfig {
    /// Create a configuration with default pacing, tick period, and seed.
    pub fn new(track_length: usize, rider_count: usize, mode: RaceMode) -> Self {
        Self {
            track_length,
            rider_count,
            mode,
            pacing: Pacing::Lockstep,
            tick_period: Duration::from_millis(72),
            seed: 0,
        }
    }

    /// Validate all structural invariants.
    ///
    /// Checks that the track is long enough, that there are enough riders
    /// for elimination racing, and that the starting grid (one rider per
    /// cell) fits on the track.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.track_length < MIN_TRACK_LENGTH {
            return Err(ConfigError::TrackTooShort {
                configured: self.track_length,
            });
        }
        if self.rider_count < MIN_RIDERS {
            return Err(ConfigError::TooFewRiders {
                configured: self.rider_count,
            });
        }
        if self.rider_count > self.track_length {
            return Err(ConfigError::TooManyRiders {
                riders: self.rider_count,
                track_length: self.track_length,
            });
        }
        Ok(())
    }
}
