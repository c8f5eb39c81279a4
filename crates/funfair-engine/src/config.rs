//! Session configuration, validated once at scheduler construction.

use std::error::Error;
use std::fmt;

use funfair_core::id::PeerId;

use crate::session::SessionRole;
use crate::state::ScreenMode;

/// Fastest supported simulation speed multiplier.
pub const MAX_TIME_SCALE: f32 = 8.0;

/// Fastest speed at which between-tick interpolation still runs;
/// beyond it the renderer only sees whole ticks.
pub const MAX_INTERPOLATED_TIME_SCALE: f32 = 4.0;

/// Everything needed to start a simulation session.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Seed for the deterministic RNG. Peers in one session share it.
    pub seed: u64,
    /// This peer's role.
    pub role: SessionRole,
    /// This peer's identity within the session.
    pub local_peer: PeerId,
    /// Simulation speed multiplier, `0 < scale <=` [`MAX_TIME_SCALE`].
    pub time_scale: f32,
    /// Render as fast as possible, interpolating between ticks. When
    /// false, rendering locks to the tick rate.
    pub uncap_fps: bool,
    /// No rendering at all; ticks only (dedicated server, tests).
    pub headless: bool,
    /// Park funds at session start, in cents.
    pub starting_funds: i64,
    /// Screen the session opens on.
    pub screen: ScreenMode,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            role: SessionRole::Local,
            local_peer: PeerId(0),
            time_scale: 1.0,
            uncap_fps: true,
            headless: false,
            starting_funds: 10_000_000,
            screen: ScreenMode::InGame,
        }
    }
}

impl SessionConfig {
    /// Check the configuration for values the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.time_scale.is_finite()
            || self.time_scale <= 0.0
            || self.time_scale > MAX_TIME_SCALE
        {
            return Err(ConfigError::InvalidTimeScale(self.time_scale));
        }
        if self.starting_funds < 0 {
            return Err(ConfigError::NegativeStartingFunds(self.starting_funds));
        }
        Ok(())
    }
}

/// A configuration value the engine refuses to start with.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ConfigError {
    /// Time scale not finite, not positive, or above the supported
    /// maximum.
    InvalidTimeScale(f32),
    /// Starting funds below zero.
    NegativeStartingFunds(i64),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTimeScale(scale) => {
                write!(f, "time scale {scale} outside (0, {MAX_TIME_SCALE}]")
            }
            Self::NegativeStartingFunds(funds) => {
                write!(f, "starting funds {funds} is negative")
            }
        }
    }
}

impl Error for ConfigError {}
