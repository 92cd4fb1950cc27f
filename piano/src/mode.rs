//! Operating mode state machine.
//!
//! The instrument is always in one of three modes, cycled by pressing the
//! button: Piano -> Metronome -> Off -> Piano. A transition fires on the press
//! and the button must be released before it can fire again, so holding the
//! button never cycles more than once.
//!
//! [`Controller::step`] runs one pass of the main loop for the current mode and
//! returns what happened, so the firmware can log it.

use embedded_hal::blocking::delay::{DelayMs, DelayUs};
use embedded_hal::digital::v2::InputPin;
use heapless::Vec;

use crate::hw::{LowPowerWait, OscillatorCounter, ToneOutput};
use crate::keys::{note_for, Control};
use crate::metronome::{Beat, Metronome};
use crate::sensor::SensorArray;
use crate::tone::{Note, Tone, ToneGenerator};
use crate::{Error, PianoConfig, CHANNELS, DEFAULT_PIANO_CONFIG};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Off,
    Piano,
    Metronome,
}

impl Mode {
    /// The mode a button press switches to
    pub fn next(self) -> Mode {
        match self {
            Mode::Off => Mode::Piano,
            Mode::Piano => Mode::Metronome,
            Mode::Metronome => Mode::Off,
        }
    }
}

/// Something observable that happened during one loop pass
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    ModeChanged(Mode),
    NoteChanged(Note),
    Beat(Beat),
    Control(Control),
}

/// Events from one loop pass. A pass produces at most a beat, a mode change and
/// a control.
pub type Events = Vec<Event, 4>;

pub struct Controller<'a, C, O, B, D, W> {
    pub sensors: SensorArray<'a, CHANNELS>,
    pub metronome: Metronome<'a>,
    tone: ToneGenerator<O>,
    counter: C,
    button: B,
    delay: D,
    sleeper: W,
    mode: Mode,
    /// Set by a mode change, cleared when the button is seen released
    switch_pending: bool,
    note: Note,
}

impl<'a, C, O, B, D, W> Controller<'a, C, O, B, D, W>
where
    C: OscillatorCounter,
    O: ToneOutput,
    B: InputPin,
    D: DelayMs<u16> + DelayUs<u16>,
    W: LowPowerWait,
{
    pub fn new(
        counter: C,
        tone: O,
        button: B,
        delay: D,
        sleeper: W,
        config: Option<&'a PianoConfig>,
    ) -> Result<Self, Error> {
        let config = config.unwrap_or(&DEFAULT_PIANO_CONFIG);
        config.validate()?;

        Ok(Self {
            sensors: SensorArray::new(Some(&config.touch)),
            metronome: Metronome::new(Some(&config.metronome)),
            tone: ToneGenerator::new(tone),
            counter,
            button,
            delay,
            sleeper,
            mode: Mode::Piano,
            switch_pending: false,
            note: Note::SILENCE,
        })
    }

    /// Seed the touch baselines. Must be called once, with no pads touched,
    /// before the first [`Controller::step`].
    pub fn calibrate(&mut self) {
        self.sensors.calibrate(&mut self.counter, &mut self.delay);
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Note selected on the last piano pass
    pub fn note(&self) -> Note {
        self.note
    }

    /// The tone currently sounding, if any
    pub fn tone(&self) -> Option<Tone> {
        self.tone.current()
    }

    /// Run one pass of the main loop
    pub fn step(&mut self) -> Events {
        let mut events = Events::new();
        match self.mode {
            Mode::Off => self.step_off(&mut events),
            Mode::Piano => self.step_piano(&mut events),
            Mode::Metronome => self.step_metronome(&mut events),
        }
        events
    }

    fn step_off(&mut self, events: &mut Events) {
        self.counter.set_enabled(false);
        self.sleeper.wait();
        self.counter.set_enabled(true);

        self.poll_button(events);
    }

    fn step_piano(&mut self, events: &mut Events) {
        let reading = self.sensors.sample_all(&mut self.counter, &mut self.delay);
        let note = note_for(&reading.tripped);

        if self.poll_button(events) {
            return;
        }

        if note != self.note {
            self.note = note;
            push(events, Event::NoteChanged(note));
        }
        self.tone.set_note(note);
    }

    fn step_metronome(&mut self, events: &mut Events) {
        if self.metronome.running {
            let beat = self.metronome.emit_beat(&mut self.tone, &mut self.delay);
            push(events, Event::Beat(beat));
        }

        self.poll_button(events);

        let reading = self.sensors.sample_all(&mut self.counter, &mut self.delay);
        if let Some(control) = self.metronome.touch(&reading) {
            push(events, Event::Control(control));
        }
    }

    /// Check the button and switch mode on a new press.
    ///
    /// Returns true if the mode changed.
    fn poll_button(&mut self, events: &mut Events) -> bool {
        // Active low. A failed read counts as released.
        let pressed = self.button.is_low().unwrap_or(false);

        if !pressed {
            self.switch_pending = false;
            return false;
        }
        if self.switch_pending {
            return false;
        }

        self.switch_pending = true;
        let next = self.mode.next();
        self.enter(next);
        push(events, Event::ModeChanged(next));
        true
    }

    fn enter(&mut self, mode: Mode) {
        self.tone.silence();
        self.note = Note::SILENCE;
        if mode == Mode::Metronome {
            self.metronome.running = true;
        }
        self.mode = mode;
    }
}

fn push(events: &mut Events, event: Event) {
    // Capacity covers the worst case pass
    let _ = events.push(event);
}
