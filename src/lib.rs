//! smf-notes - Standard MIDI File decoder
//!
//! This library provides:
//! - Decoding of Standard MIDI Files (format 0, 1 and 2) from an in-memory buffer
//! - Running status, SysEx and meta event handling
//! - Note spans resolved from note-on/note-off pairs
//!
//! Malformed but in-bounds data is tolerated: unknown events are kept as
//! [`EventKind::Other`] and a truncated track keeps the events decoded before the cut.
//!
//! # Example
//!
//! ```no_run
//! use smf_notes::decode_file;
//!
//! let file_data = std::fs::read("song.mid").unwrap();
//! let midi = decode_file(&file_data).unwrap();
//! for track in &midi.tracks {
//!     for note in &track.notes {
//!         println!("{} at {} for {}", note.key, note.start_tick, note.duration);
//!     }
//! }
//! ```

pub mod error;
pub mod options;
pub mod parser;

// Re-export main types for convenience
pub use error::SmfError;
pub use options::{DecodeOptions, TruncationPolicy};
pub use parser::{
    byte_cursor::ByteCursor,
    event_parser::{decode_event, Decoded},
    file_parser::{decode_file, decode_file_with},
    note_assembler::{assemble_notes, AssembledNotes},
    smf_types::{
        EventKind, KeySignature, MetaEvent, MidiFile, Note, OtherEvent, RawEvent, SmpteOffset,
        TimeSignature, Track, NEUTRAL_KEY,
    },
};
