use embedded_hal::blocking::delay::DelayUs;

use crate::hw::OscillatorCounter;
use crate::{TouchConfig, DEFAULT_TOUCH_CONFIG};

/// Tripped state of every channel from one sampling pass
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TouchReading<const N: usize> {
    pub tripped: [bool; N],
    /// Number of tripped channels
    pub active: u8,
}

impl<const N: usize> TouchReading<N> {
    pub const fn none() -> Self {
        Self {
            tripped: [false; N],
            active: 0,
        }
    }

    pub fn from_tripped(tripped: [bool; N]) -> Self {
        let active = tripped.iter().filter(|t| **t).count() as u8;
        Self { tripped, active }
    }

    pub fn any(&self) -> bool {
        self.active > 0
    }
}

/// An array of capacitive pads with adaptive baselines.
///
/// The baseline for each channel is seeded by [`SensorArray::calibrate`] and then
/// tracks slow drift: it snaps up immediately to any higher reading and decays
/// down toward lower ones with a 1/16 weight. Readings from a tripped channel
/// do not touch the baseline, so a held finger is never calibrated away.
pub struct SensorArray<'a, const N: usize> {
    pub average: [u16; N],
    /// Latest raw count per channel
    pub counts: [u16; N],
    /// Latest `average - count` per channel, saturating at zero
    pub deltas: [u16; N],
    pub config: &'a TouchConfig,
}

impl<'a, const N: usize> SensorArray<'a, N> {
    pub fn new(config: Option<&'a TouchConfig>) -> Self {
        let config = config.unwrap_or(&DEFAULT_TOUCH_CONFIG);
        Self {
            average: [0; N],
            counts: [0; N],
            deltas: [0; N],
            config,
        }
    }

    /// Seed every baseline with the mean of `calibration_samples` readings.
    ///
    /// The pads must be untouched while this runs.
    pub fn calibrate<C, D>(&mut self, counter: &mut C, delay: &mut D)
    where
        C: OscillatorCounter,
        D: DelayUs<u16>,
    {
        let samples = self.config.calibration_samples as u32;
        for i in 0..N {
            let mut sum: u32 = 0;
            for _ in 0..samples {
                sum += self.acquire(counter, delay, i) as u32;
            }
            self.average[i] = (sum / samples) as u16;
            self.counts[i] = self.average[i];
            self.deltas[i] = 0;
        }
    }

    /// Take one reading from every channel and update the baselines
    pub fn sample_all<C, D>(&mut self, counter: &mut C, delay: &mut D) -> TouchReading<N>
    where
        C: OscillatorCounter,
        D: DelayUs<u16>,
    {
        let mut counts = [0u16; N];
        for i in 0..N {
            counts[i] = self.acquire(counter, delay, i);
        }
        self.push(counts)
    }

    /// Process a new count for every channel
    ///
    /// Untripped channels snap up to a higher count immediately and decay
    /// slowly toward a lower one. Tripped channels leave their average alone.
    pub fn push(&mut self, counts: [u16; N]) -> TouchReading<N> {
        let mut reading = TouchReading::none();

        for i in 0..N {
            let count = counts[i];
            let average = self.average[i];
            self.counts[i] = count;
            self.deltas[i] = average.saturating_sub(count);

            // trip <= average, so this can't underflow
            let trip = average >> self.config.trip_shift;
            if count < average - trip {
                reading.tripped[i] = true;
                reading.active += 1;
            } else if count > average {
                self.average[i] = count;
            } else {
                let shift = self.config.smoothing_shift;
                self.average[i] = average - (average >> shift) + (count >> shift);
            }
        }

        reading
    }

    fn acquire<C, D>(&self, counter: &mut C, delay: &mut D, channel: usize) -> u16
    where
        C: OscillatorCounter,
        D: DelayUs<u16>,
    {
        counter.start(channel);
        delay.delay_us(self.config.window_us);
        counter.count()
    }
}
