//! Error types for the piano crate.
//!
//! Nothing in the control loop can fail. Errors only come out of constructors
//! and configuration checks.

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Note index outside 0..=8
    InvalidNote(u8),
    /// Tempo outside the range covered by the beat delay table
    BpmOutOfRange(u8),
    /// A configuration field is inconsistent
    InvalidConfig(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::InvalidNote(n) => write!(f, "Invalid note {} (must be 0-8)", n),
            Error::BpmOutOfRange(bpm) => write!(f, "BPM {} out of range (must be 40-240)", bpm),
            Error::InvalidConfig(msg) => write!(f, "Invalid config: {}", msg),
        }
    }
}
