use serde::{Deserialize, Serialize};
use std::fmt;

use crate::interval_tree::Ranged;
use crate::{Error, Range, Result};

const BPM_MIN: u32 = 8;
const BPM_MAX: u32 = 60_000_000;
const MICROSECONDS_PER_MINUTE: u32 = 60_000_000;

const SIGNATURE_COMPONENT_MIN: u8 = 1;
const SIGNATURE_COMPONENT_MAX: u8 = 128;

const ACCIDENTALS_MIN: i8 = -7;
const ACCIDENTALS_MAX: i8 = 7;

/// Major key names on the circle of fifths, indexed by `accidentals + 7`.
const MAJOR_KEYS: [&str; 15] = [
    "Cb", "Gb", "Db", "Ab", "Eb", "Bb", "F", "C", "G", "D", "A", "E", "B", "F#", "C#",
];
/// Minor key names, lowercase by convention, same indexing.
const MINOR_KEYS: [&str; 15] = [
    "ab", "eb", "bb", "f", "c", "g", "d", "a", "e", "b", "f#", "c#", "g#", "d#", "a#",
];

/// A tempo in force over a tick range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tempo {
    bpm: u32,
    range: Range,
}

impl Tempo {
    pub fn new(bpm: u32, range: Range) -> Result<Self> {
        if !(BPM_MIN..=BPM_MAX).contains(&bpm) {
            return Err(Error::InvalidTempo(bpm));
        }
        Ok(Self { bpm, range })
    }

    /// Convert a MIDI set-tempo payload (microseconds per quarter note) to
    /// beats per minute. Integer division, as the wire format intends.
    pub fn from_microseconds_per_quarter(microseconds: u32, range: Range) -> Result<Self> {
        if microseconds == 0 {
            return Err(Error::InvalidTempo(0));
        }
        Self::new(MICROSECONDS_PER_MINUTE / microseconds, range)
    }

    pub fn bpm(&self) -> u32 {
        self.bpm
    }
}

impl Ranged for Tempo {
    fn range(&self) -> Range {
        self.range
    }
}

impl fmt::Display for Tempo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} bpm", self.range, self.bpm)
    }
}

/// A time signature in force over a tick range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSignature {
    numerator: u8,
    denominator: u8,
    range: Range,
}

impl TimeSignature {
    pub fn new(numerator: u8, denominator: u8, range: Range) -> Result<Self> {
        let valid = SIGNATURE_COMPONENT_MIN..=SIGNATURE_COMPONENT_MAX;
        if !valid.contains(&numerator) || !valid.contains(&denominator) {
            return Err(Error::InvalidTimeSignature {
                numerator,
                denominator,
            });
        }
        Ok(Self {
            numerator,
            denominator,
            range,
        })
    }

    pub fn numerator(&self) -> u8 {
        self.numerator
    }

    pub fn denominator(&self) -> u8 {
        self.denominator
    }

    /// MIDI clock ticks per metronome click.
    ///
    /// Integer division loses precision for denominators that do not divide
    /// 4 evenly; unverified against the MIDI spec and kept as-is on purpose.
    pub fn clock_ticks_per_click(&self) -> u32 {
        24 * (4 / u32::from(self.denominator))
    }

    /// Ticks per measure under this signature at the given resolution.
    pub fn measure_length(&self, resolution: u16) -> u32 {
        u32::from(self.numerator) * 4 * u32::from(resolution) / u32::from(self.denominator)
    }
}

impl Ranged for TimeSignature {
    fn range(&self) -> Range {
        self.range
    }
}

impl fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} / {}", self.range, self.numerator, self.denominator)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Major,
    Minor,
}

/// A key signature in force over a tick range.
///
/// `accidentals` counts sharps (positive) or flats (negative), -7..=7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySignature {
    accidentals: i8,
    mode: Mode,
    range: Range,
}

impl KeySignature {
    pub fn new(accidentals: i8, mode: Mode, range: Range) -> Result<Self> {
        if !(ACCIDENTALS_MIN..=ACCIDENTALS_MAX).contains(&accidentals) {
            return Err(Error::InvalidKeySignature(accidentals));
        }
        Ok(Self {
            accidentals,
            mode,
            range,
        })
    }

    pub fn accidentals(&self) -> i8 {
        self.accidentals
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_major(&self) -> bool {
        self.mode == Mode::Major
    }

    /// C major and A minor group with the sharp keys.
    pub fn is_sharp(&self) -> bool {
        self.accidentals >= 0
    }

    pub fn is_flat(&self) -> bool {
        !self.is_sharp()
    }

    /// Key name, e.g. `"Eb Major"` or `"f# minor"`.
    pub fn name(&self) -> String {
        let index = (self.accidentals + 7) as usize;
        match self.mode {
            Mode::Major => format!("{} Major", MAJOR_KEYS[index]),
            Mode::Minor => format!("{} minor", MINOR_KEYS[index]),
        }
    }
}

impl Ranged for KeySignature {
    fn range(&self) -> Range {
        self.range
    }
}

impl fmt::Display for KeySignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
