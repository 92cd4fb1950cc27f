#![cfg_attr(not(test), no_std)]

//! Control logic for a four-pad capacitive touch piano with a metronome mode.
//!
//! Everything in this crate is hardware independent. The firmware supplies the
//! sampling, tone and sleep primitives through the traits in [`hw`], and drives
//! a [`mode::Controller`] from its main loop.

pub mod error;
pub mod hw;
pub mod keys;
pub mod metronome;
pub mod mode;
pub mod sensor;
pub mod tone;

#[cfg(test)]
pub mod fakes;

pub use error::Error;

/// Number of touch pads on the board
pub const CHANNELS: usize = 4;

/// Configuration for the touch sensor array
#[derive(Clone, Copy, Debug)]
pub struct TouchConfig {
    /// Number of samples averaged per channel to seed the baseline
    pub calibration_samples: u16,
    /// Length of the counting window for one sample, in microseconds
    pub window_us: u16,
    /// A channel trips when its count falls `average >> trip_shift` below the average.
    /// 3 gives a trip point 12.5% below baseline.
    pub trip_shift: u8,
    /// Weight of a new sample in the running average is `1 / (1 << smoothing_shift)`
    pub smoothing_shift: u8,
}

impl TouchConfig {
    const fn default() -> Self {
        Self {
            calibration_samples: 16,
            window_us: 1000,
            trip_shift: 3,
            smoothing_shift: 4,
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.calibration_samples == 0 {
            return Err(Error::InvalidConfig("calibration_samples must be non-zero"));
        }
        if self.trip_shift == 0 || self.trip_shift > 15 {
            return Err(Error::InvalidConfig("trip_shift must be in 1..=15"));
        }
        if self.smoothing_shift == 0 || self.smoothing_shift > 15 {
            return Err(Error::InvalidConfig("smoothing_shift must be in 1..=15"));
        }
        Ok(())
    }
}

/// Configuration for the metronome
#[derive(Clone, Copy, Debug)]
pub struct MetronomeConfig {
    /// Slowest tempo reachable from the touch controls
    pub min_bpm: u8,
    /// Fastest tempo reachable from the touch controls
    pub max_bpm: u8,
    /// Tempo change per touch sample
    pub bpm_step: u8,
    /// Tempo at power-up
    pub initial_bpm: u8,
    /// Beats per measure wraps back to 1 after this value
    pub max_beats: u8,
    /// Beats per measure at power-up
    pub initial_beats: u8,
    /// Length of the click tone, in milliseconds
    pub click_ms: u16,
    /// Subtracted from the table delay to account for the click itself
    pub click_compensation_ms: u16,
}

impl MetronomeConfig {
    const fn default() -> Self {
        Self {
            min_bpm: 60,
            max_bpm: 240,
            bpm_step: 5,
            initial_bpm: 100,
            max_beats: 8,
            initial_beats: 1,
            click_ms: 25,
            click_compensation_ms: 20,
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        use crate::metronome::{MAX_BEATS, TABLE_MAX_BPM, TABLE_MIN_BPM};

        if self.min_bpm < TABLE_MIN_BPM {
            return Err(Error::BpmOutOfRange(self.min_bpm));
        }
        if self.max_bpm > TABLE_MAX_BPM {
            return Err(Error::BpmOutOfRange(self.max_bpm));
        }
        if self.initial_bpm < self.min_bpm || self.initial_bpm > self.max_bpm {
            return Err(Error::BpmOutOfRange(self.initial_bpm));
        }
        if self.bpm_step == 0 {
            return Err(Error::InvalidConfig("bpm_step must be non-zero"));
        }
        if self.max_beats == 0 || self.max_beats > MAX_BEATS {
            return Err(Error::InvalidConfig("max_beats must be in 1..=8"));
        }
        if self.initial_beats == 0 || self.initial_beats > self.max_beats {
            return Err(Error::InvalidConfig("beats per measure must be in 1..=max_beats"));
        }
        Ok(())
    }
}

/// Configuration for the whole instrument
#[derive(Clone, Copy, Debug)]
pub struct PianoConfig {
    pub touch: TouchConfig,
    pub metronome: MetronomeConfig,
}

impl PianoConfig {
    const fn default() -> Self {
        Self {
            touch: TouchConfig::default(),
            metronome: MetronomeConfig::default(),
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        self.touch.validate()?;
        self.metronome.validate()
    }
}

pub const DEFAULT_TOUCH_CONFIG: TouchConfig = TouchConfig::default();
pub const DEFAULT_METRONOME_CONFIG: MetronomeConfig = MetronomeConfig::default();
pub const DEFAULT_PIANO_CONFIG: PianoConfig = PianoConfig::default();
