//! Hardware primitives consumed by the control logic.
//!
//! Button input and blocking delays use the `embedded-hal` traits directly. The
//! touch counter, tone output and low power wait have no `embedded-hal`
//! equivalent, so they are defined here.

/// A capacitive sensing oscillator feeding a cycle counter.
///
/// Touching a pad adds capacitance, which slows the oscillator, so a touched
/// channel counts fewer cycles in a fixed window.
pub trait OscillatorCounter {
    /// Select `channel` as the oscillator input and clear the counter
    fn start(&mut self, channel: usize);

    /// Cycles counted since the last `start`
    fn count(&mut self) -> u16;

    /// Power the sensing hardware up or down
    fn set_enabled(&mut self, _enabled: bool) {}
}

/// Square wave output driven by a period/duty timer.
pub trait ToneOutput {
    /// Program the period and on-time, in timer ticks
    fn configure(&mut self, period: u8, duty: u8);

    fn enable(&mut self);

    fn disable(&mut self);
}

/// Low power wait, returning on the next periodic wake-up.
pub trait LowPowerWait {
    fn wait(&mut self);
}
