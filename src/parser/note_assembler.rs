use crate::parser::smf_types::{EventKind, Note, RawEvent, NEUTRAL_KEY};
use std::collections::{HashMap, VecDeque};

/// Notes resolved from a track with their key range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledNotes {
    pub notes: Vec<Note>,
    pub min_key: u8,
    pub max_key: u8,
}

/// A note-on waiting for its note-off
#[derive(Debug, Clone, Copy)]
struct OpenNote {
    velocity: u8,
    start_tick: u32,
}

/// Pair note-ons with note-offs in a single pass over `events`.
///
/// A note-off closes the oldest open note-on of the same key.
/// Note-offs without an open note-on are dropped, as are note-ons still open at the end.
/// Notes are ordered by their note-off.
/// The key range starts at [`NEUTRAL_KEY`] and widens with every resolved note.
pub fn assemble_notes(events: &[RawEvent]) -> AssembledNotes {
    let mut wall_time: u32 = 0;
    let mut open_notes: HashMap<u8, VecDeque<OpenNote>> = HashMap::new();
    let mut notes = Vec::new();
    let mut min_key = NEUTRAL_KEY;
    let mut max_key = NEUTRAL_KEY;

    for event in events {
        wall_time = wall_time.saturating_add(event.delta_ticks);
        match event.kind {
            EventKind::NoteOn => {
                open_notes.entry(event.key).or_default().push_back(OpenNote {
                    velocity: event.velocity,
                    start_tick: wall_time,
                });
            }
            EventKind::NoteOff => {
                let Some(open) = open_notes
                    .get_mut(&event.key)
                    .and_then(VecDeque::pop_front)
                else {
                    log::debug!(
                        "Dropping note-off without note-on key:{} tick:{wall_time}",
                        event.key
                    );
                    continue;
                };
                notes.push(Note {
                    key: event.key,
                    velocity: open.velocity,
                    start_tick: open.start_tick,
                    duration: wall_time - open.start_tick,
                });
                min_key = min_key.min(event.key);
                max_key = max_key.max(event.key);
            }
            EventKind::Other(_) => {}
        }
    }

    let unclosed: usize = open_notes.values().map(VecDeque::len).sum();
    if unclosed > 0 {
        log::debug!("Discarding {unclosed} unclosed note-on at end of track");
    }

    AssembledNotes {
        notes,
        min_key,
        max_key,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::smf_types::{MetaEvent, OtherEvent};

    #[test]
    fn test_single_note() {
        let events = vec![
            RawEvent::note_on(0, 0, 60, 100),
            RawEvent::note_off(96, 0, 60, 0),
        ];
        let assembled = assemble_notes(&events);
        assert_eq!(
            assembled.notes,
            vec![Note {
                key: 60,
                velocity: 100,
                start_tick: 0,
                duration: 96,
            }]
        );
        assert_eq!(assembled.min_key, 60);
        assert_eq!(assembled.max_key, NEUTRAL_KEY);
    }

    #[test]
    fn test_unmatched_note_off() {
        let events = vec![
            RawEvent::note_on(0, 0, 62, 100),
            RawEvent::note_off(10, 0, 60, 0),
        ];
        let assembled = assemble_notes(&events);
        assert!(assembled.notes.is_empty());
        assert_eq!(assembled.min_key, NEUTRAL_KEY);
        assert_eq!(assembled.max_key, NEUTRAL_KEY);
    }

    #[test]
    fn test_same_key_closes_oldest_first() {
        let events = vec![
            RawEvent::note_on(0, 0, 60, 10),
            RawEvent::note_on(5, 0, 60, 20),
            RawEvent::note_off(5, 0, 60, 0),
            RawEvent::note_off(5, 0, 60, 0),
        ];
        let assembled = assemble_notes(&events);
        assert_eq!(assembled.notes.len(), 2);
        assert_eq!(assembled.notes[0].velocity, 10);
        assert_eq!(assembled.notes[0].start_tick, 0);
        assert_eq!(assembled.notes[0].duration, 10);
        assert_eq!(assembled.notes[1].velocity, 20);
        assert_eq!(assembled.notes[1].start_tick, 5);
        assert_eq!(assembled.notes[1].duration, 10);
    }

    #[test]
    fn test_other_events_advance_time() {
        let events = vec![
            RawEvent::other(
                48,
                None,
                OtherEvent::Meta(MetaEvent::TrackName("Lead".to_string())),
            ),
            RawEvent::note_on(0, 0, 72, 90),
            RawEvent::other(24, Some(0), OtherEvent::ControlChange { controller: 64, value: 127 }),
            RawEvent::note_off(24, 0, 72, 0),
        ];
        let assembled = assemble_notes(&events);
        assert_eq!(assembled.notes.len(), 1);
        assert_eq!(assembled.notes[0].start_tick, 48);
        assert_eq!(assembled.notes[0].duration, 48);
        assert_eq!(assembled.notes[0].end_tick(), 96);
    }

    #[test]
    fn test_key_range_and_unclosed() {
        let events = vec![
            RawEvent::note_on(0, 0, 40, 80),
            RawEvent::note_on(0, 0, 90, 80),
            RawEvent::note_on(0, 0, 70, 80),
            RawEvent::note_off(10, 0, 90, 0),
            RawEvent::note_off(0, 0, 70, 0),
        ];
        let assembled = assemble_notes(&events);
        // key 40 is never closed
        assert_eq!(assembled.notes.len(), 2);
        assert_eq!(assembled.notes[0].key, 90);
        assert_eq!(assembled.notes[1].key, 70);
        assert_eq!(assembled.min_key, NEUTRAL_KEY);
        assert_eq!(assembled.max_key, 90);
    }

    #[test]
    fn test_key_range_includes_neutral_key() {
        let events = vec![
            RawEvent::note_on(0, 0, 70, 80),
            RawEvent::note_off(10, 0, 70, 0),
        ];
        let assembled = assemble_notes(&events);
        assert_eq!((assembled.min_key, assembled.max_key), (64, 70));

        let events = vec![
            RawEvent::note_on(0, 0, 30, 80),
            RawEvent::note_off(10, 0, 30, 0),
        ];
        let assembled = assemble_notes(&events);
        assert_eq!((assembled.min_key, assembled.max_key), (30, 64));
    }
}
