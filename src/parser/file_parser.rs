use crate::options::DecodeOptions;
use crate::parser::byte_cursor::ByteCursor;
use crate::parser::primitive_parser::{parse_tag, parse_u16_be, parse_u32_be};
use crate::parser::smf_types::MidiFile;
use crate::parser::track_parser::TrackParser;
use crate::SmfError;
use nom::combinator::map;
use nom::{IResult, Parser};

// SMF docs at <http://www.somascape.org/midi/tech/mfile.html>

pub const HEADER_CHUNK_ID: [u8; 4] = *b"MThd";
pub const HEADER_LENGTH: u32 = 6;

/// Content of the `MThd` chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmfHeader {
    pub chunk_id: [u8; 4],
    pub length: u32,
    pub format: u16,
    pub track_count: u16,
    pub division: u16,
}

/// Parse the 14 bytes file header.
pub fn parse_header(i: &[u8]) -> IResult<&[u8], SmfHeader> {
    map(
        (
            parse_tag,    // Chunk id
            parse_u32_be, // Header length
            parse_u16_be, // Format
            parse_u16_be, // Track count
            parse_u16_be, // Division
        ),
        |(chunk_id, length, format, track_count, division)| SmfHeader {
            chunk_id,
            length,
            format,
            track_count,
            division,
        },
    )
    .parse(i)
}

/// Decode a complete Standard MIDI File with the default options.
pub fn decode_file(file_data: &[u8]) -> Result<MidiFile, SmfError> {
    decode_file_with(file_data, &DecodeOptions::default())
}

pub fn decode_file_with(file_data: &[u8], options: &DecodeOptions) -> Result<MidiFile, SmfError> {
    let mut cursor = ByteCursor::new(file_data);
    let header = cursor.parse(parse_header).map_err(|_err| {
        log::error!("Failed to parse SMF header");
        SmfError::InvalidHeader(format!(
            "expected 14 bytes header, got {} bytes",
            file_data.len()
        ))
    })?;
    log::debug!("SMF header {header:?}");

    if options.strict_chunk_ids && header.chunk_id != HEADER_CHUNK_ID {
        return Err(SmfError::InvalidHeader(format!(
            "unexpected chunk id {:02X?}",
            header.chunk_id
        )));
    }
    if options.validate_format && header.format > 2 {
        return Err(SmfError::UnsupportedFormat(header.format));
    }
    if header.length > HEADER_LENGTH {
        let extra = (header.length - HEADER_LENGTH) as usize;
        log::debug!("Skipping {extra} extra header bytes");
        cursor.read_bytes(extra).map_err(|_err| {
            SmfError::InvalidHeader(format!("header length {} past end of file", header.length))
        })?;
    }

    let mut parser = TrackParser::new(options);
    let mut tracks = Vec::with_capacity(usize::from(header.track_count));
    for track_index in 0..header.track_count {
        match parser.parse_track(&mut cursor) {
            Ok(mut track) => {
                track.resolve_notes();
                log::debug!(
                    "Track {track_index}: {} events {} notes",
                    track.events.len(),
                    track.notes.len()
                );
                tracks.push(track);
            }
            Err(err) if err.is_truncated() && options.tolerates_truncation() => {
                log::warn!(
                    "Buffer ended before track {track_index} of {}: {err}",
                    header.track_count
                );
                break;
            }
            Err(err) => return Err(err),
        }
    }

    Ok(MidiFile {
        format: header.format,
        track_count: header.track_count,
        division: header.division,
        tracks,
        tempo_micros_per_quarter: parser.tempo(),
    })
}
