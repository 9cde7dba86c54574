use crate::options::DecodeOptions;
use crate::parser::byte_cursor::ByteCursor;
use crate::parser::event_parser::{decode_event, Decoded, NO_STATUS};
use crate::parser::smf_types::{MetaEvent, RawEvent, Track, MICROS_PER_MINUTE};
use crate::SmfError;

pub const TRACK_CHUNK_ID: [u8; 4] = *b"MTrk";

/// Decodes track chunks one after the other.
///
/// Holds the state shared by all tracks of a file: only the first Set Tempo is retained.
pub struct TrackParser<'o> {
    options: &'o DecodeOptions,
    tempo: Option<u32>,
}

impl<'o> TrackParser<'o> {
    pub const fn new(options: &'o DecodeOptions) -> Self {
        Self {
            options,
            tempo: None,
        }
    }

    /// Microseconds per quarter note of the first Set Tempo seen so far
    pub const fn tempo(&self) -> Option<u32> {
        self.tempo
    }

    /// Decode a track chunk header and its events.
    ///
    /// Ends on the end-of-track meta event or when the buffer is exhausted.
    /// The declared chunk length is not used to bound the events.
    pub fn parse_track(&mut self, cursor: &mut ByteCursor<'_>) -> Result<Track, SmfError> {
        let chunk_position = cursor.position();
        let chunk_id = cursor.read_tag()?;
        let chunk_length = cursor.read_u32_be()?;
        log::debug!(
            "Parsing track chunk {:?} length:{chunk_length} at byte {chunk_position}",
            String::from_utf8_lossy(&chunk_id)
        );
        if chunk_id != TRACK_CHUNK_ID {
            if self.options.strict_chunk_ids {
                return Err(SmfError::InvalidChunkId {
                    position: chunk_position,
                    found: chunk_id,
                });
            }
            log::warn!("Unexpected track chunk id {chunk_id:02X?} at byte {chunk_position}");
        }

        let mut track = Track::default();
        let mut previous_status = NO_STATUS;
        let mut end_of_track = false;
        while !cursor.at_end() {
            match decode_event(cursor, previous_status) {
                Ok((Decoded::Event(event), status)) => {
                    previous_status = status;
                    self.absorb(&mut track, event);
                }
                Ok((Decoded::EndOfTrack, _)) => {
                    end_of_track = true;
                    break;
                }
                Err(err) if err.is_truncated() && self.options.tolerates_truncation() => {
                    log::warn!(
                        "Track truncated after {} events: {err}",
                        track.events.len()
                    );
                    return Ok(track);
                }
                Err(err) => return Err(err),
            }
        }
        if !end_of_track {
            log::warn!("Track without end of track marker");
        }
        Ok(track)
    }

    fn absorb(&mut self, track: &mut Track, event: RawEvent) {
        match event.meta() {
            Some(MetaEvent::TrackName(name)) => track.name = Some(name.clone()),
            Some(MetaEvent::InstrumentName(name)) => track.instrument = Some(name.clone()),
            Some(MetaEvent::Tempo(tempo)) => match self.tempo {
                None if *tempo == 0 => log::warn!("Ignoring zero tempo"),
                None => {
                    log::debug!("Tempo: {tempo} ({}bpm)", MICROS_PER_MINUTE / tempo);
                    self.tempo = Some(*tempo);
                }
                Some(current) => log::debug!("Ignoring tempo {tempo}, already set to {current}"),
            },
            Some(MetaEvent::TimeSignature(signature)) if track.time_signature.is_none() => {
                track.time_signature = Some(*signature);
            }
            Some(MetaEvent::KeySignature(signature)) if track.key_signature.is_none() => {
                track.key_signature = Some(*signature);
            }
            _ => {}
        }
        track.events.push(event);
    }
}
