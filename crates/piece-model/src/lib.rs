pub mod event;
pub mod interval_tree;
pub mod meta;
pub mod note;
pub mod pair;
pub mod range;

pub use event::{
    EventSet, KeySignatureEvent, NoteOff, NoteOn, TempoEvent, TimeSignatureEvent, TimelineEvent,
};
pub use interval_tree::{IntervalTree, Ranged};
pub use meta::{KeySignature, Mode, Tempo, TimeSignature};
pub use note::{Note, MIDDLE_C};
pub use pair::pair_notes;
pub use range::Range;

/// Errors from timeline-model construction and note pairing.
///
/// All of these are value-level data-validation failures detected at the
/// single construction boundary of the offending type. Nothing here is
/// transient; the caller recovers only by supplying corrected input.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid range [{low}, {high}]: low must be strictly less than high")]
    InvalidRange { low: u32, high: u32 },

    #[error("pitch {0} is outside the MIDI range 0-127")]
    InvalidPitch(u8),

    #[error("tempo {0} bpm is outside the MIDI-permitted range 8-60000000")]
    InvalidTempo(u32),

    #[error("time signature {numerator}/{denominator} has a component outside 1-128")]
    InvalidTimeSignature { numerator: u8, denominator: u8 },

    #[error("key signature accidental count {0} is outside -7..=7")]
    InvalidKeySignature(i8),

    /// Note-on events left over after pairing: notes that never end.
    #[error("{} note-on event(s) were never paired with a note off", .0.len())]
    UnpairedNoteOn(Vec<event::NoteOn>),

    /// Note-off events left over after pairing: redundant termination signals.
    #[error("{} note-off event(s) were never paired with a note on", .0.len())]
    UnpairedNoteOff(Vec<event::NoteOff>),
}

pub type Result<T> = std::result::Result<T, Error>;
