use std::fmt;

use piece_model::{Note, Range, Ranged, MIDDLE_C};
use serde::{Deserialize, Serialize};

/// Physical limits for one hand.
///
/// The defaults encode an average adult hand: a major ninth of stretch and
/// no more than six simultaneous notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitProfile {
    /// Widest reach from the anchor finger, in semitones.
    pub span_max: u8,
    /// Most notes one hand takes.
    pub notes_max: usize,
}

impl Default for SplitProfile {
    fn default() -> Self {
        Self {
            span_max: 14,
            notes_max: 6,
        }
    }
}

/// One vertical slice of the piece: every note sounding in one window,
/// pitch-sorted, split into what the left hand, the right hand, and neither
/// can reach.
///
/// A column is about simultaneity, not succession. Notes that started
/// before the window bleed in as holdovers and make the column impure; no
/// note may conceptually start inside it.
#[derive(Debug, Clone)]
pub struct Column {
    notes: Vec<Note>,
    range: Range,
    is_pure: bool,
    is_semi_pure: bool,

    left: Vec<Note>,
    middle: Vec<Note>,
    right: Vec<Note>,

    /// Index into `notes` of the top left-hand note.
    left_thumb: Option<usize>,
    /// Index into `notes` of the bottom right-hand note.
    right_thumb: Option<usize>,
}

impl Column {
    /// Build a column over `range`, marking holdovers, computing purity,
    /// and running the two-hand split under `profile`.
    pub fn new(notes: Vec<Note>, range: Range, profile: &SplitProfile) -> Self {
        let mut notes = notes;
        notes.sort_by_key(Note::pitch);

        let mut is_pure = true;
        let mut is_semi_pure = true;
        for note in &notes {
            if note.range() != range {
                is_pure = false;
            }
            if note.stop() > range.high() {
                is_pure = false;
                is_semi_pure = false;
                break;
            }
        }

        let notes: Vec<Note> = notes
            .into_iter()
            .map(|note| {
                if note.start() < range.low() {
                    note.held()
                } else {
                    note
                }
            })
            .collect();

        let mut column = Self {
            notes,
            range,
            is_pure,
            is_semi_pure,
            left: Vec::new(),
            middle: Vec::new(),
            right: Vec::new(),
            left_thumb: None,
            right_thumb: None,
        };
        column.split(profile);
        column
    }

    /// The deterministic default split.
    ///
    /// A lone note goes to whichever hand's side of middle C it sits on.
    /// Otherwise the left hand fills bottom-up from the lowest note and the
    /// right hand top-down from the highest, each stopping at the profile's
    /// hard limits; whatever neither hand reached is the middle. A left
    /// hand that took everything while sitting entirely above middle C
    /// hands its notes to the right.
    fn split(&mut self, profile: &SplitProfile) {
        let size = self.notes.len();
        if size == 0 {
            return;
        }

        if size == 1 {
            let note = self.notes[0].clone();
            if note.pitch() < MIDDLE_C {
                self.left.push(note);
            } else {
                self.right.push(note);
            }
            return;
        }

        let anchor = self.notes[0].pitch();
        let mut i = 0;
        while i < size {
            let note = &self.notes[i];
            if note.pitch() - anchor > profile.span_max {
                break;
            }
            if self.left.len() == profile.notes_max {
                break;
            }
            self.left.push(note.clone());
            i += 1;
        }
        // a zero note budget takes nothing, leaving no left thumb
        let left_thumb = i.checked_sub(1);
        self.left_thumb = left_thumb;

        let anchor = self.notes[size - 1].pitch();
        let floor = left_thumb.map_or(1, |thumb| thumb + 1);
        let mut i = size - 1;
        while i >= floor {
            let note = &self.notes[i];
            if anchor - note.pitch() > profile.span_max {
                break;
            }
            if self.right.len() == profile.notes_max {
                break;
            }
            self.right.push(note.clone());
            i -= 1;
        }
        self.right.reverse();
        let right_thumb = i + 1;
        self.right_thumb = (right_thumb < size).then_some(right_thumb);

        let middle_start = left_thumb.map_or(0, |thumb| thumb + 1);
        for note in &self.notes[middle_start..right_thumb] {
            self.middle.push(note.clone());
        }

        if self.right.is_empty() {
            if let Some(lowest) = self.left.first() {
                if lowest.pitch() > MIDDLE_C {
                    self.right = std::mem::take(&mut self.left);
                }
            }
        }
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn left_hand(&self) -> &[Note] {
        &self.left
    }

    pub fn middle(&self) -> &[Note] {
        &self.middle
    }

    pub fn right_hand(&self) -> &[Note] {
        &self.right
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Every note exactly fills the column's range.
    pub fn is_pure(&self) -> bool {
        self.is_pure
    }

    /// No note extends past the column's right edge; holdovers from the
    /// left are allowed.
    pub fn is_semi_pure(&self) -> bool {
        self.is_semi_pure
    }

    /// False when notes were left between the hands.
    pub fn is_two_handed(&self) -> bool {
        self.middle.is_empty()
    }

    pub fn low_note(&self) -> Option<&Note> {
        self.notes.first()
    }

    pub fn high_note(&self) -> Option<&Note> {
        self.notes.last()
    }

    /// Semitones between the lowest and highest notes.
    pub fn overall_span(&self) -> Option<u8> {
        Some(self.high_note()?.pitch() - self.low_note()?.pitch())
    }

    pub fn mean_pitch(&self) -> Option<u8> {
        if self.notes.is_empty() {
            return None;
        }
        let sum: u32 = self.notes.iter().map(|note| u32::from(note.pitch())).sum();
        Some((sum / self.notes.len() as u32) as u8)
    }

    pub fn median_pitch(&self) -> Option<u8> {
        Some(self.notes.get(self.notes.len() / 2)?.pitch())
    }

    /// Semitones between the thumbs, i.e. how far apart the hands sit.
    pub fn split_span(&self) -> Option<u8> {
        let lh = self.notes.get(self.left_thumb?)?.pitch();
        let rh = self.notes.get(self.right_thumb?)?.pitch();
        Some(rh - lh)
    }

    /// The imaginary pitch exactly halfway between the thumbs, rounding
    /// toward the right thumb on odd spans.
    pub fn split_point_pitch(&self) -> Option<u8> {
        let rh = self.notes.get(self.right_thumb?)?.pitch();
        Some(rh - self.split_span()? / 2)
    }

    /// The union of the member notes' ranges, holdovers included; differs
    /// from [`Ranged::range`] for impure columns.
    pub fn actual_range(&self) -> Option<Range> {
        let low = self.notes.iter().map(Note::start).min()?;
        let high = self.notes.iter().map(Note::stop).max()?;
        Range::new(low, high).ok()
    }
}

impl Ranged for Column {
    fn range(&self) -> Range {
        self.range
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |notes: &[Note]| {
            notes
                .iter()
                .map(Note::name)
                .collect::<Vec<_>>()
                .join(", ")
        };
        write!(
            f,
            "{} => LH: {}  ->  M: {}  ->  RH: {}",
            self.range,
            join(&self.left),
            join(&self.middle),
            join(&self.right)
        )
    }
}
