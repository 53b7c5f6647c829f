use serde::{Deserialize, Serialize};

use crate::meta::Mode;

/// A note-on record from the ingestion collaborator, on one sanitized
/// logical channel. Ticks are in the source resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteOn {
    pub tick: u32,
    pub pitch: u8,
    pub velocity: u8,
    pub track: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteOff {
    pub tick: u32,
    pub pitch: u8,
    pub track: String,
}

/// A set-tempo record; payload is microseconds per quarter note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TempoEvent {
    pub tick: u32,
    pub microseconds_per_quarter: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSignatureEvent {
    pub tick: u32,
    pub numerator: u8,
    pub denominator: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySignatureEvent {
    pub tick: u32,
    pub accidentals: i8,
    pub mode: Mode,
}

/// One timeline event, dispatched by exhaustive match rather than by a
/// status-byte class hierarchy. Each variant carries only its own fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineEvent {
    NoteOn(NoteOn),
    NoteOff(NoteOff),
    Tempo(TempoEvent),
    TimeSignature(TimeSignatureEvent),
    KeySignature(KeySignatureEvent),
}

impl TimelineEvent {
    /// Classify a raw note message. A note-on with velocity zero is the
    /// running-status spelling of a note-off; this reads the record and
    /// returns the right variant instead of rewriting bytes in place.
    pub fn classify_note(tick: u32, pitch: u8, velocity: u8, track: impl Into<String>) -> Self {
        if velocity == 0 {
            TimelineEvent::NoteOff(NoteOff {
                tick,
                pitch,
                track: track.into(),
            })
        } else {
            TimelineEvent::NoteOn(NoteOn {
                tick,
                pitch,
                velocity,
                track: track.into(),
            })
        }
    }

    pub fn tick(&self) -> u32 {
        match self {
            TimelineEvent::NoteOn(e) => e.tick,
            TimelineEvent::NoteOff(e) => e.tick,
            TimelineEvent::Tempo(e) => e.tick,
            TimelineEvent::TimeSignature(e) => e.tick,
            TimelineEvent::KeySignature(e) => e.tick,
        }
    }
}

/// The pipeline's input: one collection per event kind, aggregated across
/// all source tracks onto a single timeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSet {
    pub note_ons: Vec<NoteOn>,
    pub note_offs: Vec<NoteOff>,
    pub tempos: Vec<TempoEvent>,
    pub time_signatures: Vec<TimeSignatureEvent>,
    pub key_signatures: Vec<KeySignatureEvent>,
}

impl EventSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route one event to its collection, preserving arrival order within
    /// each kind.
    pub fn push(&mut self, event: TimelineEvent) {
        match event {
            TimelineEvent::NoteOn(e) => self.note_ons.push(e),
            TimelineEvent::NoteOff(e) => self.note_offs.push(e),
            TimelineEvent::Tempo(e) => self.tempos.push(e),
            TimelineEvent::TimeSignature(e) => self.time_signatures.push(e),
            TimelineEvent::KeySignature(e) => self.key_signatures.push(e),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.note_ons.is_empty()
            && self.note_offs.is_empty()
            && self.tempos.is_empty()
            && self.time_signatures.is_empty()
            && self.key_signatures.is_empty()
    }
}

impl Extend<TimelineEvent> for EventSet {
    fn extend<I: IntoIterator<Item = TimelineEvent>>(&mut self, iter: I) {
        for event in iter {
            self.push(event);
        }
    }
}

impl FromIterator<TimelineEvent> for EventSet {
    fn from_iter<I: IntoIterator<Item = TimelineEvent>>(iter: I) -> Self {
        let mut set = EventSet::new();
        set.extend(iter);
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn zero_velocity_classifies_as_note_off() {
        let event = TimelineEvent::classify_note(480, 60, 0, "piano");
        assert_eq!(
            event,
            TimelineEvent::NoteOff(NoteOff {
                tick: 480,
                pitch: 60,
                track: "piano".into(),
            })
        );
    }

    #[test]
    fn positive_velocity_classifies_as_note_on() {
        let event = TimelineEvent::classify_note(0, 60, 90, "piano");
        assert_eq!(
            event,
            TimelineEvent::NoteOn(NoteOn {
                tick: 0,
                pitch: 60,
                velocity: 90,
                track: "piano".into(),
            })
        );
    }

    #[test]
    fn event_set_routes_by_kind() {
        let set: EventSet = vec![
            TimelineEvent::classify_note(0, 60, 90, "a"),
            TimelineEvent::classify_note(479, 60, 0, "a"),
            TimelineEvent::Tempo(TempoEvent {
                tick: 0,
                microseconds_per_quarter: 500_000,
            }),
            TimelineEvent::TimeSignature(TimeSignatureEvent {
                tick: 0,
                numerator: 4,
                denominator: 4,
            }),
            TimelineEvent::KeySignature(KeySignatureEvent {
                tick: 0,
                accidentals: 0,
                mode: Mode::Major,
            }),
        ]
        .into_iter()
        .collect();

        assert_eq!(set.note_ons.len(), 1);
        assert_eq!(set.note_offs.len(), 1);
        assert_eq!(set.tempos.len(), 1);
        assert_eq!(set.time_signatures.len(), 1);
        assert_eq!(set.key_signatures.len(), 1);
        assert!(!set.is_empty());
    }
}
