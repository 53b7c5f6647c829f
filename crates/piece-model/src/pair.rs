use crate::event::{NoteOff, NoteOn};
use crate::{Error, Note, Range, Result};

/// Pair independent note-on and note-off streams into well-formed notes.
///
/// Both collections are stable-sorted by tick, so same-tick events keep
/// their source-document order. Each on-event, in that order, consumes the
/// first remaining same-pitch off-event at or after its own tick:
///
/// - same tick: both events are dropped silently (a zero-length spurious
///   pair, which MIDI authoring tools do emit);
/// - later tick: a note spanning `[on.tick, off.tick]` is emitted.
///
/// A note re-triggered before its previous instance is released therefore
/// collapses onto the available offs in arrival order, and overlapping
/// same-pitch spans coexist as long as their offs are distinct.
///
/// The whole call fails, with the orphaned events attached, if any on-event
/// is left over (a note that never ends) or any off-event is left over (a
/// redundant termination). No partial note list is ever returned.
pub fn pair_notes(ons: &[NoteOn], offs: &[NoteOff]) -> Result<Vec<Note>> {
    let mut ons = ons.to_vec();
    let mut offs = offs.to_vec();
    ons.sort_by_key(|on| on.tick);
    offs.sort_by_key(|off| off.tick);

    let mut notes = Vec::with_capacity(ons.len());
    let mut off_used = vec![false; offs.len()];
    let mut orphaned_ons = Vec::new();

    for on in &ons {
        let mut matched = false;
        for (i, off) in offs.iter().enumerate() {
            if off_used[i] || off.pitch != on.pitch || off.tick < on.tick {
                continue;
            }
            off_used[i] = true;
            matched = true;
            if off.tick != on.tick {
                let range = Range::new(on.tick, off.tick)?;
                notes.push(Note::new(on.pitch, range, on.track.clone())?);
            }
            break;
        }
        if !matched {
            orphaned_ons.push(on.clone());
        }
    }

    if !orphaned_ons.is_empty() {
        return Err(Error::UnpairedNoteOn(orphaned_ons));
    }

    let orphaned_offs: Vec<NoteOff> = offs
        .into_iter()
        .zip(off_used)
        .filter(|(_, used)| !used)
        .map(|(off, _)| off)
        .collect();
    if !orphaned_offs.is_empty() {
        return Err(Error::UnpairedNoteOff(orphaned_offs));
    }

    Ok(notes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Ranged;
    use pretty_assertions::assert_eq;

    const C4: u8 = 60;
    const E4: u8 = 64;

    fn on(pitch: u8, tick: u32) -> NoteOn {
        NoteOn {
            tick,
            pitch,
            velocity: 90,
            track: "piano".into(),
        }
    }

    fn off(pitch: u8, tick: u32) -> NoteOff {
        NoteOff {
            tick,
            pitch,
            track: "piano".into(),
        }
    }

    #[test]
    fn balanced_input_pairs_completely() {
        let ons = vec![on(C4, 0), on(E4, 0), on(C4, 480)];
        let offs = vec![off(C4, 479), off(E4, 479), off(C4, 959)];

        let notes = pair_notes(&ons, &offs).unwrap();
        assert_eq!(notes.len(), 3);
        assert_eq!(notes[0].range(), Range::new(0, 479).unwrap());
        assert_eq!(notes[0].pitch(), C4);
        assert_eq!(notes[2].range(), Range::new(480, 959).unwrap());
    }

    #[test]
    fn stuck_note_fails_with_unpaired_on() {
        // Two ons, one off: the earliest unresolved on takes the off, the
        // re-trigger at 480 is left stuck.
        let ons = vec![on(C4, 0), on(C4, 480)];
        let offs = vec![off(C4, 959)];

        let err = pair_notes(&ons, &offs).unwrap_err();
        match err {
            Error::UnpairedNoteOn(orphans) => {
                assert_eq!(orphans, vec![on(C4, 480)]);
            }
            other => panic!("expected UnpairedNoteOn, got {other:?}"),
        }
    }

    #[test]
    fn redundant_off_fails_with_unpaired_off() {
        let ons = vec![on(C4, 0)];
        let offs = vec![off(C4, 479), off(C4, 1919)];

        let err = pair_notes(&ons, &offs).unwrap_err();
        match err {
            Error::UnpairedNoteOff(orphans) => {
                assert_eq!(orphans, vec![off(C4, 1919)]);
            }
            other => panic!("expected UnpairedNoteOff, got {other:?}"),
        }
    }

    #[test]
    fn overlapping_same_pitch_spans_coexist() {
        // A short and a long C4 both starting at tick 0: arrival order pairs
        // the first on with the first off.
        let ons = vec![on(C4, 0), on(C4, 0)];
        let offs = vec![off(C4, 479), off(C4, 1919)];

        let notes = pair_notes(&ons, &offs).unwrap();
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].range(), Range::new(0, 479).unwrap());
        assert_eq!(notes[1].range(), Range::new(0, 1919).unwrap());
    }

    #[test]
    fn off_before_any_on_is_never_consumed() {
        // an off preceding its pitch's only on leaves both events orphaned;
        // the stuck on is reported first
        let ons = vec![on(C4, 100)];
        let offs = vec![off(C4, 50)];

        let err = pair_notes(&ons, &offs).unwrap_err();
        match err {
            Error::UnpairedNoteOn(orphans) => {
                assert_eq!(orphans, vec![on(C4, 100)]);
            }
            other => panic!("expected UnpairedNoteOn, got {other:?}"),
        }
    }

    #[test]
    fn leading_off_falls_through_to_the_leftover_check() {
        // the on skips the too-early off and takes the later one, so the
        // early off surfaces as the redundant event it is
        let ons = vec![on(C4, 100)];
        let offs = vec![off(C4, 50), off(C4, 200)];

        let err = pair_notes(&ons, &offs).unwrap_err();
        match err {
            Error::UnpairedNoteOff(orphans) => {
                assert_eq!(orphans, vec![off(C4, 50)]);
            }
            other => panic!("expected UnpairedNoteOff, got {other:?}"),
        }
    }

    #[test]
    fn zero_length_pair_is_discarded_silently() {
        let ons = vec![on(C4, 0), on(E4, 0)];
        let offs = vec![off(C4, 0), off(E4, 479)];

        let notes = pair_notes(&ons, &offs).unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].pitch(), E4);
    }

    #[test]
    fn layered_retriggers_collapse_in_arrival_order() {
        // C4 re-triggered every quarter with offs arriving late: each on
        // takes the next available off, not the nearest one.
        let ons = vec![on(C4, 0), on(C4, 480), on(C4, 960)];
        let offs = vec![off(C4, 479), off(C4, 959), off(C4, 1439)];

        let notes = pair_notes(&ons, &offs).unwrap();
        let spans: Vec<(u32, u32)> = notes.iter().map(|n| (n.start(), n.stop())).collect();
        assert_eq!(spans, vec![(0, 479), (480, 959), (960, 1439)]);
    }

    #[test]
    fn empty_input_is_trivially_paired() {
        let notes = pair_notes(&[], &[]).unwrap();
        assert!(notes.is_empty());
    }
}
