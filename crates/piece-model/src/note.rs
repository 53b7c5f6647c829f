use serde::{Deserialize, Serialize};
use std::fmt;

use crate::interval_tree::Ranged;
use crate::{Error, Range, Result};

/// MIDI key 60, the hand splitter's anchor pitch.
pub const MIDDLE_C: u8 = 60;

const PITCH_MAX: u8 = 127;

/// Spelled with flats; good enough for diagnostics and display.
const PITCH_NAMES: [&str; 12] = [
    "C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B",
];

/// A single sounding note on the tick timeline.
///
/// Created by the pairing matcher, or directly with a validated pitch.
/// Immutable once built; `held` produces a tagged copy rather than mutating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pitch: u8,
    range: Range,
    instrument: String,
    is_held: bool,
}

impl Note {
    pub fn new(pitch: u8, range: Range, instrument: impl Into<String>) -> Result<Self> {
        if pitch > PITCH_MAX {
            return Err(Error::InvalidPitch(pitch));
        }
        Ok(Self {
            pitch,
            range,
            instrument: instrument.into(),
            is_held: false,
        })
    }

    pub fn pitch(&self) -> u8 {
        self.pitch
    }

    pub fn instrument(&self) -> &str {
        &self.instrument
    }

    /// True if this note started before the window it was grouped into.
    pub fn is_held(&self) -> bool {
        self.is_held
    }

    pub fn start(&self) -> u32 {
        self.range.low()
    }

    pub fn stop(&self) -> u32 {
        self.range.high()
    }

    pub fn duration(&self) -> u32 {
        self.range.duration()
    }

    pub fn pitch_class(&self) -> u8 {
        self.pitch % 12
    }

    /// Copy of this note tagged as held over from an earlier window.
    pub fn held(&self) -> Note {
        Note {
            is_held: true,
            ..self.clone()
        }
    }

    /// Spelled pitch name, e.g. `"C4"` for key 60, `"Eb4"` for key 63.
    pub fn name(&self) -> String {
        let letter = PITCH_NAMES[usize::from(self.pitch_class())];
        let octave = i16::from(self.pitch / 12) - 1;
        format!("{letter}{octave}")
    }
}

impl Ranged for Note {
    fn range(&self) -> Range {
        self.range
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name(), self.range)
    }
}
