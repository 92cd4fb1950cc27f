use embedded_hal::blocking::delay::DelayMs;

use crate::hw::ToneOutput;
use crate::keys::{control_for, Control};
use crate::sensor::TouchReading;
use crate::tone::{Tone, ToneGenerator, ACCENT_TONE, BEAT_TONE};
use crate::{MetronomeConfig, CHANNELS, DEFAULT_METRONOME_CONFIG};

pub const TABLE_MIN_BPM: u8 = 40;
pub const TABLE_MAX_BPM: u8 = 240;
/// Longest measure the beat counter supports
pub const MAX_BEATS: u8 = 8;
const TABLE_STEP: u8 = 5;

/// Milliseconds between beats for 40..=240 BPM in steps of 5
pub const BEAT_DELAY_MS: [u16; 41] = [
    1500, 1333, 1200, 1091, 1000, 923, 857, 800,
    750, 706, 667, 632, 600, 571, 545, 522,
    500, 480, 462, 444, 429, 414, 400, 387,
    375, 364, 353, 343, 333, 324, 316, 308,
    300, 293, 286, 279, 273, 267, 261, 255,
    250,
];

/// Look up the beat interval for `bpm`.
///
/// Tempos between table steps round down to the step below; tempos outside the
/// table are clamped to its ends.
pub fn beat_delay_ms(bpm: u8) -> u16 {
    let bpm = bpm.clamp(TABLE_MIN_BPM, TABLE_MAX_BPM);
    BEAT_DELAY_MS[((bpm - TABLE_MIN_BPM) / TABLE_STEP) as usize]
}

/// Record of one emitted beat
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Beat {
    /// Position of the beat in its measure
    pub index: u8,
    pub tone: Tone,
    /// Time spent waiting after the click
    pub wait_ms: u16,
}

pub struct Metronome<'a> {
    /// Index of the next beat in the measure, 0..beats
    pub beat: u8,
    /// Beats per measure
    pub beats: u8,
    pub bpm: u8,
    pub running: bool,
    /// Set while a latching control is held, cleared when all pads are released
    pub latch: bool,
    pub config: &'a MetronomeConfig,
}

impl<'a> Metronome<'a> {
    pub fn new(config: Option<&'a MetronomeConfig>) -> Self {
        let config = config.unwrap_or(&DEFAULT_METRONOME_CONFIG);
        Self {
            beat: 0,
            beats: config.initial_beats,
            bpm: config.initial_bpm,
            running: true,
            latch: false,
            config,
        }
    }

    /// Tone for the next beat: accented on the first beat of a measure
    pub fn beat_tone(&self) -> Tone {
        if self.beat == 0 {
            ACCENT_TONE
        } else {
            BEAT_TONE
        }
    }

    /// Wait after the click, in milliseconds, for the current tempo
    pub fn wait_ms(&self) -> u16 {
        beat_delay_ms(self.bpm).saturating_sub(self.config.click_compensation_ms)
    }

    /// Click once and block for the rest of the beat interval.
    ///
    /// The click takes `click_ms` and the following wait is the table delay less
    /// `click_compensation_ms`.
    pub fn emit_beat<O, D>(&mut self, tone: &mut ToneGenerator<O>, delay: &mut D) -> Beat
    where
        O: ToneOutput,
        D: DelayMs<u16>,
    {
        let beat = Beat {
            index: self.beat,
            tone: self.beat_tone(),
            wait_ms: self.wait_ms(),
        };

        tone.play(beat.tone);
        delay.delay_ms(self.config.click_ms);
        tone.silence();
        delay.delay_ms(beat.wait_ms);

        self.beat += 1;
        if self.beat >= self.beats {
            self.beat = 0;
        }

        beat
    }

    /// Interpret a touch reading as a metronome control and apply it.
    ///
    /// Returns the control that fired, if any.
    pub fn touch(&mut self, reading: &TouchReading<CHANNELS>) -> Option<Control> {
        if !reading.any() {
            self.latch = false;
            return None;
        }

        let control = control_for(&reading.tripped, self.latch)?;
        self.apply(control);
        Some(control)
    }

    pub fn apply(&mut self, control: Control) {
        match control {
            Control::CycleBeats => {
                if self.beats >= self.config.max_beats {
                    self.beats = 1;
                    self.beat = 0;
                } else {
                    self.beats += 1;
                }
            }
            Control::Faster => {
                self.bpm = self.bpm.saturating_add(self.config.bpm_step).min(self.config.max_bpm);
            }
            Control::Slower => {
                self.bpm = self.bpm.saturating_sub(self.config.bpm_step).max(self.config.min_bpm);
            }
            Control::StartStop => {
                self.running = !self.running;
            }
        }

        if control.is_latching() {
            self.latch = true;
        }
    }
}

#[cfg(test)]
pub mod test {
    use super::*;
    use crate::fakes::{FakeDelay, FakeTone};

    fn touch(tripped: [bool; CHANNELS]) -> TouchReading<CHANNELS> {
        TouchReading::from_tripped(tripped)
    }

    const RELEASE: [bool; CHANNELS] = [false; CHANNELS];
    const PAD0: [bool; CHANNELS] = [true, false, false, false];
    const PAD1: [bool; CHANNELS] = [false, true, false, false];
    const PAD2: [bool; CHANNELS] = [false, false, true, false];
    const PAD3: [bool; CHANNELS] = [false, false, false, true];

    #[test]
    fn test_delay_table() {
        assert_eq!(beat_delay_ms(40), 1500);
        assert_eq!(beat_delay_ms(60), 1000);
        assert_eq!(beat_delay_ms(100), 600);
        assert_eq!(beat_delay_ms(115), 522);
        assert_eq!(beat_delay_ms(240), 250);
        // Between steps rounds down to the lower tempo
        assert_eq!(beat_delay_ms(102), 600);
        // Out of range clamps
        assert_eq!(beat_delay_ms(10), 1500);
        assert_eq!(beat_delay_ms(255), 250);
    }

    #[test]
    fn test_emit_beat_timing() {
        let output = FakeTone::new();
        let mut generator = ToneGenerator::new(output.clone());
        let delay = FakeDelay::new();
        let mut metronome = Metronome::new(None);
        assert_eq!(metronome.bpm, 100);

        // 100 BPM is table index (100 - 40) / 5 = 12
        let beat = metronome.emit_beat(&mut generator, &mut delay.clone());

        assert_eq!(beat.index, 0);
        assert_eq!(beat.tone, ACCENT_TONE);
        assert_eq!(beat.wait_ms, 600 - 20);
        assert_eq!(delay.ms_calls(), vec![25, 580]);
        assert_eq!(output.programmed(), Some((93, 47)));
        assert!(!output.enabled(), "Tone left on after the click");
    }

    #[test]
    fn test_accent_on_first_beat() {
        let output = FakeTone::new();
        let mut generator = ToneGenerator::new(output.clone());
        let mut delay = FakeDelay::new();
        let mut metronome = Metronome::new(None);
        metronome.beats = 3;

        let tones: Vec<Tone> = (0..7)
            .map(|_| metronome.emit_beat(&mut generator, &mut delay).tone)
            .collect();
        assert_eq!(
            tones,
            vec![ACCENT_TONE, BEAT_TONE, BEAT_TONE, ACCENT_TONE, BEAT_TONE, BEAT_TONE, ACCENT_TONE]
        );
    }

    #[test]
    fn test_single_beat_measure() {
        let mut generator = ToneGenerator::new(FakeTone::new());
        let mut delay = FakeDelay::new();
        let mut metronome = Metronome::new(None);
        assert_eq!(metronome.beats, 1);

        for _ in 0..3 {
            assert_eq!(metronome.emit_beat(&mut generator, &mut delay).index, 0);
        }
    }

    #[test]
    fn test_cycle_beats_wraps_at_configured_max() {
        static SHORT: MetronomeConfig = MetronomeConfig {
            max_beats: 3,
            ..DEFAULT_METRONOME_CONFIG
        };
        let mut metronome = Metronome::new(Some(&SHORT));

        let mut seen = Vec::new();
        for _ in 0..4 {
            metronome.apply(Control::CycleBeats);
            seen.push(metronome.beats);
        }
        assert_eq!(seen, [2, 3, 1, 2]);
    }

    #[test]
    fn test_cycle_beats_wraps() {
        let mut metronome = Metronome::new(None);
        let mut seen = Vec::new();

        for press in 0..8 {
            if press == 7 {
                // Somewhere in the middle of an 8 beat measure
                metronome.beat = 5;
            }
            assert_eq!(metronome.touch(&touch(PAD0)), Some(Control::CycleBeats));
            seen.push(metronome.beats);
            if press < 7 {
                assert_eq!(metronome.beat, 0);
            }

            // Holding does nothing more
            assert_eq!(metronome.touch(&touch(PAD0)), None);
            assert_eq!(metronome.touch(&touch(RELEASE)), None);
        }

        assert_eq!(seen, vec![2, 3, 4, 5, 6, 7, 8, 1]);
        assert_eq!(metronome.beat, 0);
    }

    #[test]
    fn test_cycle_beats_keeps_beat_until_wrap() {
        let mut metronome = Metronome::new(None);
        metronome.beats = 4;
        metronome.beat = 2;

        metronome.apply(Control::CycleBeats);
        assert_eq!((metronome.beats, metronome.beat), (5, 2));
    }

    #[test]
    fn test_bpm_clamps() {
        let mut metronome = Metronome::new(None);

        for _ in 0..100 {
            metronome.touch(&touch(PAD1));
        }
        assert_eq!(metronome.bpm, 240);
        metronome.touch(&touch(PAD1));
        assert_eq!(metronome.bpm, 240);

        for _ in 0..100 {
            metronome.touch(&touch(PAD2));
        }
        assert_eq!(metronome.bpm, 60);
        metronome.touch(&touch(PAD2));
        assert_eq!(metronome.bpm, 60);
    }

    #[test]
    fn test_bpm_repeats_while_held() {
        let mut metronome = Metronome::new(None);

        metronome.touch(&touch(PAD1));
        metronome.touch(&touch(PAD1));
        metronome.touch(&touch(PAD1));
        assert_eq!(metronome.bpm, 115);
        assert!(!metronome.latch);
    }

    #[test]
    fn test_start_stop_once_per_touch() {
        let mut metronome = Metronome::new(None);
        assert!(metronome.running);

        assert_eq!(metronome.touch(&touch(PAD3)), Some(Control::StartStop));
        assert!(!metronome.running);
        for _ in 0..10 {
            metronome.touch(&touch(PAD3));
        }
        assert!(!metronome.running, "Held touch toggled again");

        metronome.touch(&touch(RELEASE));
        metronome.touch(&touch(PAD3));
        assert!(metronome.running);
    }

    #[test]
    fn test_latched_pad0_falls_through_to_tempo() {
        let mut metronome = Metronome::new(None);

        metronome.touch(&touch(PAD0));
        assert!(metronome.latch);

        // Pad 0 still held, pad 1 added: the tempo control fires
        assert_eq!(
            metronome.touch(&touch([true, true, false, false])),
            Some(Control::Faster)
        );
        assert_eq!(metronome.bpm, 105);
        assert_eq!(metronome.beats, 2);
    }
}
