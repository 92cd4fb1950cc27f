use crate::hw::ToneOutput;
use crate::Error;

/// A square wave tone as programmed into the tone timer.
///
/// `period` and `duty` are in timer ticks. The firmware runs the timer with a
/// 16 µs tick, so the frequency is `62500 / (period + 1)` Hz.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tone {
    pub period: u8,
    pub duty: u8,
}

impl Tone {
    pub const fn new(period: u8, duty: u8) -> Self {
        Self { period, duty }
    }
}

/// Tones for notes 1..=8, A4 up the A major scale to A5.
///
/// Tuned by ear on the board rather than calculated, so the duty is only
/// approximately half the period.
pub const TONE_TABLE: [Tone; 8] = [
    Tone::new(140, 71), // A4
    Tone::new(125, 63), // B4
    Tone::new(111, 56), // C#5
    Tone::new(105, 53), // D5
    Tone::new(93, 47),  // E5
    Tone::new(83, 42),  // F#5
    Tone::new(74, 38),  // G#5
    Tone::new(69, 35),  // A5
];

/// Metronome click on the first beat of a measure (E5)
pub const ACCENT_TONE: Tone = TONE_TABLE[4];
/// Metronome click on the other beats (C#5)
pub const BEAT_TONE: Tone = TONE_TABLE[2];

/// A piano note: 0 is silence, 1..=8 index [`TONE_TABLE`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Note(u8);

impl Note {
    pub const SILENCE: Note = Note(0);
    pub const MAX: u8 = TONE_TABLE.len() as u8;

    pub fn new(index: u8) -> Result<Self, Error> {
        if index > Self::MAX {
            Err(Error::InvalidNote(index))
        } else {
            Ok(Note(index))
        }
    }

    pub(crate) const fn from_index(index: u8) -> Self {
        Note(index)
    }

    pub fn index(&self) -> u8 {
        self.0
    }

    pub fn is_silent(&self) -> bool {
        self.0 == 0
    }

    pub fn tone(&self) -> Option<Tone> {
        match self.0 {
            0 => None,
            n => Some(TONE_TABLE[n as usize - 1]),
        }
    }
}

/// Single channel tone generator
pub struct ToneGenerator<O> {
    output: O,
    current: Option<Tone>,
}

impl<O: ToneOutput> ToneGenerator<O> {
    /// Take ownership of the output and make sure it is silent
    pub fn new(mut output: O) -> Self {
        output.disable();
        Self {
            output,
            current: None,
        }
    }

    /// Play `note`, or stop output for silence.
    ///
    /// The output is reprogrammed on every call, even if the note hasn't changed.
    pub fn set_note(&mut self, note: Note) {
        match note.tone() {
            Some(tone) => self.play(tone),
            None => self.silence(),
        }
    }

    pub fn play(&mut self, tone: Tone) {
        self.output.configure(tone.period, tone.duty);
        self.output.enable();
        self.current = Some(tone);
    }

    pub fn silence(&mut self) {
        self.output.disable();
        self.current = None;
    }

    /// The tone currently sounding, if any
    pub fn current(&self) -> Option<Tone> {
        self.current
    }
}
