//! Interpretation of the four pads.
//!
//! The pads are indexed left to right as `tripped[0..4]`. Seven notes come from
//! single pads and from the gaps between neighbours, the eighth from touching
//! both outer pads:
//!
//! ```text
//!     | pad 0 | | pad 1 | | pad 2 | | pad 3 |
//!     | note7 | | note5 | | note3 | | note1 |
//!     +-------+ +-------+ +-------+ +-------+
//!              |         |         |
//!            note6     note4     note2        pad 0 + pad 3: note8
//! ```
//!
//! In metronome mode the same pads act as four momentary controls instead.

use crate::tone::Note;
use crate::CHANNELS;

/// Map tripped pads to a note.
///
/// The checks are first-match-wins and their order matters: later rules rely on
/// earlier ones having excluded some patterns. Nothing tripped gives silence.
pub fn note_for(tripped: &[bool; CHANNELS]) -> Note {
    let [t0, t1, t2, t3] = *tripped;

    let n = if t0 && t3 {
        8
    } else if t0 && !t1 {
        7
    } else if t0 && t1 {
        6
    } else if !t0 && t1 && !t2 {
        5
    } else if t1 && t2 {
        4
    } else if !t1 && t2 && !t3 {
        3
    } else if t2 && t3 {
        2
    } else if t3 && !t2 {
        1
    } else {
        0
    };

    Note::from_index(n)
}

/// Metronome control selected by a touch
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    /// Step beats per measure 1..=8, wrapping
    CycleBeats,
    Faster,
    Slower,
    StartStop,
}

impl Control {
    /// Controls that should fire once per touch rather than repeat while held
    pub fn is_latching(&self) -> bool {
        matches!(self, Control::CycleBeats | Control::StartStop)
    }
}

/// Map tripped pads to a metronome control.
///
/// `latched` is set while a latching control is being held. Like [`note_for`]
/// this is first-match-wins: a held pad 0 with the latch set falls through to the
/// tempo pads.
pub fn control_for(tripped: &[bool; CHANNELS], latched: bool) -> Option<Control> {
    if tripped[0] && !latched {
        Some(Control::CycleBeats)
    } else if tripped[1] {
        Some(Control::Faster)
    } else if tripped[2] {
        Some(Control::Slower)
    } else if tripped[3] && !latched {
        Some(Control::StartStop)
    } else {
        None
    }
}
