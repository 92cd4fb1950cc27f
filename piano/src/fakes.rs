//! Host-side stand-ins for the hardware primitives.
//!
//! Each fake is a cheap handle onto shared state, so a test can keep one clone
//! to drive and inspect while the code under test owns another.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::blocking::delay::{DelayMs, DelayUs};
use embedded_hal::digital::v2::InputPin;

use crate::hw::{LowPowerWait, OscillatorCounter, ToneOutput};
use crate::CHANNELS;

#[derive(Default)]
struct CounterState {
    levels: [u16; CHANNELS],
    queued: [VecDeque<u16>; CHANNELS],
    selected: usize,
    starts: usize,
    enabled: bool,
    disable_calls: usize,
}

/// Counter returning a fixed level per channel, or queued values first if any
#[derive(Clone, Default)]
pub struct FakeCounter {
    state: Rc<RefCell<CounterState>>,
}

impl FakeCounter {
    pub fn new(levels: [u16; CHANNELS]) -> Self {
        let counter = Self::default();
        {
            let mut state = counter.state.borrow_mut();
            state.levels = levels;
            state.enabled = true;
        }
        counter
    }

    pub fn set_level(&self, channel: usize, level: u16) {
        self.state.borrow_mut().levels[channel] = level;
    }

    pub fn queue(&self, channel: usize, count: u16) {
        self.state.borrow_mut().queued[channel].push_back(count);
    }

    pub fn starts(&self) -> usize {
        self.state.borrow().starts
    }

    pub fn enabled(&self) -> bool {
        self.state.borrow().enabled
    }

    pub fn disable_calls(&self) -> usize {
        self.state.borrow().disable_calls
    }
}

impl OscillatorCounter for FakeCounter {
    fn start(&mut self, channel: usize) {
        let mut state = self.state.borrow_mut();
        assert!(state.enabled, "Sampling while sensing is disabled");
        state.selected = channel;
        state.starts += 1;
    }

    fn count(&mut self) -> u16 {
        let mut state = self.state.borrow_mut();
        let channel = state.selected;
        match state.queued[channel].pop_front() {
            Some(count) => count,
            None => state.levels[channel],
        }
    }

    fn set_enabled(&mut self, enabled: bool) {
        let mut state = self.state.borrow_mut();
        state.enabled = enabled;
        if !enabled {
            state.disable_calls += 1;
        }
    }
}

#[derive(Default)]
struct DelayState {
    ms: Vec<u16>,
    us: Vec<u16>,
}

/// Delay that returns immediately and records what was asked for
#[derive(Clone, Default)]
pub struct FakeDelay {
    state: Rc<RefCell<DelayState>>,
}

impl FakeDelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ms_calls(&self) -> Vec<u16> {
        self.state.borrow().ms.clone()
    }

    pub fn total_us(&self) -> u32 {
        self.state.borrow().us.iter().map(|us| *us as u32).sum()
    }

    pub fn clear(&self) {
        let mut state = self.state.borrow_mut();
        state.ms.clear();
        state.us.clear();
    }
}

impl DelayMs<u16> for FakeDelay {
    fn delay_ms(&mut self, ms: u16) {
        self.state.borrow_mut().ms.push(ms);
    }
}

impl DelayUs<u16> for FakeDelay {
    fn delay_us(&mut self, us: u16) {
        self.state.borrow_mut().us.push(us);
    }
}

#[derive(Default)]
struct ToneState {
    programmed: Option<(u8, u8)>,
    enabled: bool,
    configure_calls: usize,
}

#[derive(Clone, Default)]
pub struct FakeTone {
    state: Rc<RefCell<ToneState>>,
}

impl FakeTone {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last (period, duty) programmed
    pub fn programmed(&self) -> Option<(u8, u8)> {
        self.state.borrow().programmed
    }

    pub fn enabled(&self) -> bool {
        self.state.borrow().enabled
    }

    pub fn configure_calls(&self) -> usize {
        self.state.borrow().configure_calls
    }
}

impl ToneOutput for FakeTone {
    fn configure(&mut self, period: u8, duty: u8) {
        let mut state = self.state.borrow_mut();
        state.programmed = Some((period, duty));
        state.configure_calls += 1;
    }

    fn enable(&mut self) {
        self.state.borrow_mut().enabled = true;
    }

    fn disable(&mut self) {
        self.state.borrow_mut().enabled = false;
    }
}

/// Active low push button, released until pressed
#[derive(Clone, Default)]
pub struct FakeButton {
    pressed: Rc<Cell<bool>>,
}

impl FakeButton {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&self) {
        self.pressed.set(true);
    }

    pub fn release(&self) {
        self.pressed.set(false);
    }
}

impl InputPin for FakeButton {
    type Error = Infallible;

    fn is_high(&self) -> Result<bool, Infallible> {
        Ok(!self.pressed.get())
    }

    fn is_low(&self) -> Result<bool, Infallible> {
        Ok(self.pressed.get())
    }
}

#[derive(Clone, Default)]
pub struct FakeSleep {
    waits: Rc<Cell<usize>>,
}

impl FakeSleep {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn waits(&self) -> usize {
        self.waits.get()
    }
}

impl LowPowerWait for FakeSleep {
    fn wait(&mut self) {
        self.waits.set(self.waits.get() + 1);
    }
}
