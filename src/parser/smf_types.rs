//! Standard MIDI File data structures
//!
//! Reference: <http://www.somascape.org/midi/tech/mfile.html>

use crate::parser::note_assembler::assemble_notes;

/// Starting value of the `min_key`/`max_key` range of a track (middle E)
pub const NEUTRAL_KEY: u8 = 64;

/// Microseconds in a minute, used to derive the BPM from a tempo
pub const MICROS_PER_MINUTE: u32 = 60_000_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    NoteOn,
    NoteOff,
    /// Everything which is not a note boundary
    Other(OtherEvent),
}

/// Detail of an event collapsed into [`EventKind::Other`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OtherEvent {
    Aftertouch { key: u8, pressure: u8 },
    ControlChange { controller: u8, value: u8 },
    ProgramChange { program: u8 },
    ChannelPressure { pressure: u8 },
    /// 14 bits value, 0x2000 is centered
    PitchBend { value: u16 },
    /// System exclusive message, only the payload length is kept
    SysEx { status: u8, length: usize },
    Meta(MetaEvent),
    /// Status byte matching no known event class
    Unrecognized { status: u8 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaEvent {
    SequenceNumber(Option<u16>),
    Text(String),
    Copyright(String),
    TrackName(String),
    InstrumentName(String),
    Lyric(String),
    Marker(String),
    CuePoint(String),
    ChannelPrefix(u8),
    /// Microseconds per quarter note
    Tempo(u32),
    SmpteOffset(SmpteOffset),
    TimeSignature(TimeSignature),
    KeySignature(KeySignature),
    SequencerSpecific { length: usize },
    /// Known meta type whose payload is too short for its fields
    Malformed { kind: u8, length: usize },
    Unknown { kind: u8, length: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmpteOffset {
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
    pub frames: u8,
    pub subframes: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSignature {
    pub numerator: u8,
    /// Denominator as a power of two (2 means a quarter note)
    pub denominator_power: u8,
    /// MIDI clocks per metronome click
    pub clocks_per_click: u8,
    pub thirty_seconds_per_quarter: u8,
}

impl TimeSignature {
    pub fn denominator(&self) -> Option<u32> {
        1u32.checked_shl(u32::from(self.denominator_power))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeySignature {
    /// Negative for flats, positive for sharps
    pub sharps_flats: i8,
    pub minor: bool,
}

/// One decoded MIDI event.
///
/// `key` and `velocity` are only meaningful for note events and are zero otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    pub kind: EventKind,
    /// Channel of channel voice events
    pub channel: Option<u8>,
    pub key: u8,
    pub velocity: u8,
    /// Ticks since the previous event of the same track
    pub delta_ticks: u32,
}

impl RawEvent {
    pub const fn note_on(delta_ticks: u32, channel: u8, key: u8, velocity: u8) -> Self {
        Self {
            kind: EventKind::NoteOn,
            channel: Some(channel),
            key,
            velocity,
            delta_ticks,
        }
    }

    pub const fn note_off(delta_ticks: u32, channel: u8, key: u8, velocity: u8) -> Self {
        Self {
            kind: EventKind::NoteOff,
            channel: Some(channel),
            key,
            velocity,
            delta_ticks,
        }
    }

    pub const fn other(delta_ticks: u32, channel: Option<u8>, detail: OtherEvent) -> Self {
        Self {
            kind: EventKind::Other(detail),
            channel,
            key: 0,
            velocity: 0,
            delta_ticks,
        }
    }

    pub const fn is_note_on(&self) -> bool {
        matches!(self.kind, EventKind::NoteOn)
    }

    pub const fn is_note_off(&self) -> bool {
        matches!(self.kind, EventKind::NoteOff)
    }

    pub fn meta(&self) -> Option<&MetaEvent> {
        match &self.kind {
            EventKind::Other(OtherEvent::Meta(meta)) => Some(meta),
            _ => None,
        }
    }
}

/// A resolved note span
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Note {
    pub key: u8,
    /// Velocity of the originating note-on
    pub velocity: u8,
    /// Absolute tick of the note-on
    pub start_tick: u32,
    pub duration: u32,
}

impl Note {
    pub const fn end_tick(&self) -> u32 {
        self.start_tick.saturating_add(self.duration)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub name: Option<String>,
    pub instrument: Option<String>,
    pub events: Vec<RawEvent>,
    pub notes: Vec<Note>,
    pub min_key: u8,
    pub max_key: u8,
    /// First time signature of the track
    pub time_signature: Option<TimeSignature>,
    /// First key signature of the track
    pub key_signature: Option<KeySignature>,
}

impl Default for Track {
    fn default() -> Self {
        Self {
            name: None,
            instrument: None,
            events: vec![],
            notes: vec![],
            min_key: NEUTRAL_KEY,
            max_key: NEUTRAL_KEY,
            time_signature: None,
            key_signature: None,
        }
    }
}

impl Track {
    /// Derive `notes` and key bounds from `events`.
    pub fn resolve_notes(&mut self) {
        let assembled = assemble_notes(&self.events);
        self.notes = assembled.notes;
        self.min_key = assembled.min_key;
        self.max_key = assembled.max_key;
    }

    /// Absolute tick of the last event
    pub fn length_ticks(&self) -> u64 {
        self.events.iter().map(|e| u64::from(e.delta_ticks)).sum()
    }
}

/// A decoded Standard MIDI File
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MidiFile {
    /// 0, 1 or 2
    pub format: u16,
    /// Track count declared in the header
    pub track_count: u16,
    /// Raw division field, ticks per quarter note or SMPTE timing
    pub division: u16,
    pub tracks: Vec<Track>,
    /// First Set Tempo of the file
    pub tempo_micros_per_quarter: Option<u32>,
}

impl MidiFile {
    pub fn bpm(&self) -> Option<u32> {
        self.tempo_micros_per_quarter
            .filter(|tempo| *tempo > 0)
            .map(|tempo| MICROS_PER_MINUTE / tempo)
    }

    /// `None` when the division uses SMPTE timing (bit 15 set)
    pub const fn ticks_per_quarter(&self) -> Option<u16> {
        if self.division & 0x8000 == 0 {
            Some(self.division)
        } else {
            None
        }
    }

    pub fn note_count(&self) -> usize {
        self.tracks.iter().map(|t| t.notes.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bpm() {
        let mut file = MidiFile::default();
        assert_eq!(file.bpm(), None);
        file.tempo_micros_per_quarter = Some(500_000);
        assert_eq!(file.bpm(), Some(120));
        file.tempo_micros_per_quarter = Some(600_000);
        assert_eq!(file.bpm(), Some(100));
    }

    #[test]
    fn test_ticks_per_quarter() {
        let mut file = MidiFile {
            division: 480,
            ..MidiFile::default()
        };
        assert_eq!(file.ticks_per_quarter(), Some(480));
        // -25 fps, 40 ticks per frame
        file.division = 0xE728;
        assert_eq!(file.ticks_per_quarter(), None);
    }

    #[test]
    fn test_time_signature_denominator() {
        let ts = TimeSignature {
            numerator: 6,
            denominator_power: 3,
            clocks_per_click: 36,
            thirty_seconds_per_quarter: 8,
        };
        assert_eq!(ts.denominator(), Some(8));
        let broken = TimeSignature {
            denominator_power: 40,
            ..ts
        };
        assert_eq!(broken.denominator(), None);
    }

    #[test]
    fn test_empty_track_bounds() {
        let mut track = Track::default();
        track.resolve_notes();
        assert!(track.notes.is_empty());
        assert_eq!(track.min_key, NEUTRAL_KEY);
        assert_eq!(track.max_key, NEUTRAL_KEY);
        assert_eq!(track.length_ticks(), 0);
    }
}
