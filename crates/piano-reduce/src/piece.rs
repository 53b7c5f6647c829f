use piece_model::{
    pair_notes, EventSet, IntervalTree, KeySignature, Mode, Note, Range, Ranged, Tempo,
    TimeSignature,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::column::{Column, SplitProfile};
use crate::quantize::{quantize, scale_tick, RESOLUTION};
use crate::{Error, Result};

/// Immutable timing facts threaded through the pipeline instead of a
/// process-global resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimelineContext {
    resolution: u16,
    total_ticks: u32,
}

impl TimelineContext {
    /// The source document's ticks per quarter note.
    pub fn resolution(&self) -> u16 {
        self.resolution
    }

    /// Ticks in the piece after quantization, exclusive end.
    pub fn total_ticks(&self) -> u32 {
        self.total_ticks
    }
}

/// Knobs for one reduction run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReduceOptions {
    /// Column width in canonical ticks.
    pub window_size: u32,
    pub split_profile: SplitProfile,
}

impl Default for ReduceOptions {
    fn default() -> Self {
        Self {
            // one quarter note at the canonical resolution
            window_size: u32::from(RESOLUTION),
            split_profile: SplitProfile::default(),
        }
    }
}

/// The reduced piece: quantized notes in an interval index, meta events
/// with their ranges of effect, and one hand-split [`Column`] per window.
///
/// Built in one pass and never mutated; the note index can be queried from
/// any number of threads.
#[derive(Debug, Clone)]
pub struct Piece {
    context: TimelineContext,
    range: Range,
    notes: IntervalTree<Note>,
    columns: Vec<Column>,
    tempos: Vec<Tempo>,
    time_signatures: Vec<TimeSignature>,
    key_signatures: Vec<KeySignature>,
}

impl Piece {
    /// Run the whole reduction over one event set.
    ///
    /// Pairs the note streams, snaps every note to the rhythmic grid,
    /// indexes them, assigns each meta event its range of effect, and
    /// slices the piece into fixed-size columns. Any pairing or validation
    /// failure aborts the run; no partial piece is ever produced.
    pub fn reduce(events: &EventSet, resolution: u16, options: &ReduceOptions) -> Result<Piece> {
        if resolution == 0 || resolution > RESOLUTION {
            return Err(Error::InvalidResolution(resolution));
        }
        let scale = u32::from(RESOLUTION / resolution);

        let paired = pair_notes(&events.note_ons, &events.note_offs)?;
        debug!(notes = paired.len(), "paired note events");

        let mut notes = Vec::with_capacity(paired.len());
        for note in &paired {
            let snapped = quantize(note.range(), resolution)?;
            notes.push(Note::new(note.pitch(), snapped, note.instrument())?);
        }

        let tree = IntervalTree::new(notes);
        let last_tick = tree.last_tick().unwrap_or(0);
        let range = Range::new(0, last_tick + 1)?;
        debug!(%range, nodes = tree.len_nodes(), "indexed quantized notes");

        let tempos = assign_ranges(
            scaled_ticks(&events.tempos, |event| event.tick, scale)?,
            range.high(),
            |event, r| Ok(Tempo::from_microseconds_per_quarter(event.microseconds_per_quarter, r)?),
        )?;
        let time_signatures = assign_ranges(
            scaled_ticks(&events.time_signatures, |event| event.tick, scale)?,
            range.high(),
            |event, r| Ok(TimeSignature::new(event.numerator, event.denominator, r)?),
        )?;
        let mut key_signatures = assign_ranges(
            scaled_ticks(&events.key_signatures, |event| event.tick, scale)?,
            range.high(),
            |event, r| Ok(KeySignature::new(event.accidentals, event.mode, r)?),
        )?;
        if key_signatures.is_empty() {
            // an undeclared key reads as C major over the whole piece
            key_signatures.push(KeySignature::new(0, Mode::Major, range)?);
        }

        let columns: Vec<Column> = range
            .windows(options.window_size)
            .into_iter()
            .map(|window| {
                let members = tree.query(window).into_iter().cloned().collect();
                Column::new(members, window, &options.split_profile)
            })
            .collect();
        debug!(columns = columns.len(), "built reduction columns");

        Ok(Piece {
            context: TimelineContext {
                resolution,
                total_ticks: last_tick + 1,
            },
            range,
            notes: tree,
            columns,
            tempos,
            time_signatures,
            key_signatures,
        })
    }

    pub fn context(&self) -> TimelineContext {
        self.context
    }

    pub fn notes(&self) -> &IntervalTree<Note> {
        &self.notes
    }

    /// Every note sounding anywhere in `window`.
    pub fn notes_in(&self, window: Range) -> Vec<&Note> {
        self.notes.query(window)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn tempos(&self) -> &[Tempo] {
        &self.tempos
    }

    pub fn time_signatures(&self) -> &[TimeSignature] {
        &self.time_signatures
    }

    pub fn key_signatures(&self) -> &[KeySignature] {
        &self.key_signatures
    }
}

impl Ranged for Piece {
    fn range(&self) -> Range {
        self.range
    }
}

/// Pair each event with its tick rescaled onto the canonical timeline.
fn scaled_ticks<E>(
    events: &[E],
    tick_of: impl Fn(&E) -> u32,
    scale: u32,
) -> Result<Vec<(u32, &E)>> {
    events
        .iter()
        .map(|event| Ok((scale_tick(tick_of(event), scale)?, event)))
        .collect()
}

/// Give each meta event the range it is in force over: from its own tick to
/// just before the next event's, the last running to the piece end.
/// Same-tick duplicates from parallel tracks collapse to the first seen.
fn assign_ranges<E, T>(
    mut events: Vec<(u32, E)>,
    piece_end: u32,
    build: impl Fn(E, Range) -> Result<T>,
) -> Result<Vec<T>> {
    events.sort_by_key(|(tick, _)| *tick);
    events.dedup_by_key(|(tick, _)| *tick);

    let ticks: Vec<u32> = events.iter().map(|(tick, _)| *tick).collect();
    let ranges = Range::from_start_ticks(&ticks, piece_end.saturating_add(1))?;

    events
        .into_iter()
        .zip(ranges)
        .map(|((_, event), range)| build(event, range))
        .collect()
}
