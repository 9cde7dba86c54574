use crate::parser::byte_cursor::ByteCursor;
use crate::parser::primitive_parser::make_string;
use crate::parser::smf_types::{
    KeySignature, MetaEvent, OtherEvent, RawEvent, SmpteOffset, TimeSignature,
};
use crate::SmfError;

// channel voice messages (upper nibble)
pub const NOTE_OFF: u8 = 0x80;
pub const NOTE_ON: u8 = 0x90;
pub const AFTERTOUCH: u8 = 0xA0;
pub const CONTROL_CHANGE: u8 = 0xB0;
pub const PROGRAM_CHANGE: u8 = 0xC0;
pub const CHANNEL_PRESSURE: u8 = 0xD0;
pub const PITCH_BEND: u8 = 0xE0;

// system messages (full byte)
pub const SYSEX_BEGIN: u8 = 0xF0;
pub const SYSEX_CONTINUATION: u8 = 0xF7;
pub const META: u8 = 0xFF;

// meta event types
pub const META_SEQUENCE: u8 = 0x00;
pub const META_TEXT: u8 = 0x01;
pub const META_COPYRIGHT: u8 = 0x02;
pub const META_TRACK_NAME: u8 = 0x03;
pub const META_INSTRUMENT_NAME: u8 = 0x04;
pub const META_LYRICS: u8 = 0x05;
pub const META_MARKER: u8 = 0x06;
pub const META_CUE_POINT: u8 = 0x07;
pub const META_CHANNEL_PREFIX: u8 = 0x20;
pub const META_END_OF_TRACK: u8 = 0x2F;
pub const META_SET_TEMPO: u8 = 0x51;
pub const META_SMPTE_OFFSET: u8 = 0x54;
pub const META_TIME_SIGNATURE: u8 = 0x58;
pub const META_KEY_SIGNATURE: u8 = 0x59;
pub const META_SEQUENCER_SPECIFIC: u8 = 0x7F;

/// Running status value meaning "no previous status"
pub const NO_STATUS: u8 = 0;

/// Outcome of decoding one event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    Event(RawEvent),
    EndOfTrack,
}

/// Decode one event starting at its delta-time.
///
/// `previous_status` is the running status left by the previous event of the track,
/// the returned status must be fed to the next call.
pub fn decode_event(
    cursor: &mut ByteCursor<'_>,
    previous_status: u8,
) -> Result<(Decoded, u8), SmfError> {
    let delta_ticks = cursor.read_vlq()?;
    let mut status = cursor.read_u8()?;

    // running status, the byte read is the first data byte of the previous event type
    if status < 0x80 {
        status = previous_status;
        cursor.unread_one()?;
    }

    match status {
        0x80..=0xEF => {
            let event = decode_channel_event(cursor, delta_ticks, status)?;
            Ok((Decoded::Event(event), status))
        }
        SYSEX_BEGIN | SYSEX_CONTINUATION => {
            let length = cursor.read_vlq()? as usize;
            cursor.read_bytes(length)?;
            log::debug!("SysEx status:{status:02X} length:{length}");
            let event = RawEvent::other(delta_ticks, None, OtherEvent::SysEx { status, length });
            Ok((Decoded::Event(event), NO_STATUS))
        }
        META => {
            let decoded = match decode_meta_event(cursor)? {
                Some(meta) => Decoded::Event(RawEvent::other(
                    delta_ticks,
                    None,
                    OtherEvent::Meta(meta),
                )),
                None => Decoded::EndOfTrack,
            };
            Ok((decoded, NO_STATUS))
        }
        _ => {
            log::warn!(
                "Unrecognized status byte {status:02X} at byte {}",
                cursor.position()
            );
            let event = RawEvent::other(delta_ticks, None, OtherEvent::Unrecognized { status });
            Ok((Decoded::Event(event), NO_STATUS))
        }
    }
}

fn decode_channel_event(
    cursor: &mut ByteCursor<'_>,
    delta_ticks: u32,
    status: u8,
) -> Result<RawEvent, SmfError> {
    let channel = status & 0x0F;
    let event = match status & 0xF0 {
        NOTE_OFF => {
            let key = cursor.read_u8()?;
            let velocity = cursor.read_u8()?;
            RawEvent::note_off(delta_ticks, channel, key, velocity)
        }
        NOTE_ON => {
            let key = cursor.read_u8()?;
            let velocity = cursor.read_u8()?;
            if velocity == 0 {
                RawEvent::note_off(delta_ticks, channel, key, velocity)
            } else {
                RawEvent::note_on(delta_ticks, channel, key, velocity)
            }
        }
        AFTERTOUCH => {
            let key = cursor.read_u8()?;
            let pressure = cursor.read_u8()?;
            let detail = OtherEvent::Aftertouch { key, pressure };
            RawEvent::other(delta_ticks, Some(channel), detail)
        }
        CONTROL_CHANGE => {
            let controller = cursor.read_u8()?;
            let value = cursor.read_u8()?;
            let detail = OtherEvent::ControlChange { controller, value };
            RawEvent::other(delta_ticks, Some(channel), detail)
        }
        PROGRAM_CHANGE => {
            let program = cursor.read_u8()?;
            let detail = OtherEvent::ProgramChange { program };
            RawEvent::other(delta_ticks, Some(channel), detail)
        }
        CHANNEL_PRESSURE => {
            let pressure = cursor.read_u8()?;
            let detail = OtherEvent::ChannelPressure { pressure };
            RawEvent::other(delta_ticks, Some(channel), detail)
        }
        PITCH_BEND => {
            let lsb = cursor.read_u8()?;
            let msb = cursor.read_u8()?;
            let value = (u16::from(msb & 0x7F) << 7) | u16::from(lsb & 0x7F);
            RawEvent::other(delta_ticks, Some(channel), OtherEvent::PitchBend { value })
        }
        _ => RawEvent::other(delta_ticks, None, OtherEvent::Unrecognized { status }),
    };
    Ok(event)
}

/// Decode a meta event after its `0xFF` status, `None` marks the end of track.
///
/// The whole declared payload is consumed before being interpreted.
fn decode_meta_event(cursor: &mut ByteCursor<'_>) -> Result<Option<MetaEvent>, SmfError> {
    let kind = cursor.read_u8()?;
    let length = cursor.read_vlq()? as usize;
    let payload = cursor.read_bytes(length)?;

    let meta = match kind {
        META_END_OF_TRACK => {
            log::debug!("End of track");
            return Ok(None);
        }
        META_SEQUENCE => {
            let number = match payload {
                [msb, lsb, ..] => Some(u16::from_be_bytes([*msb, *lsb])),
                _ => None,
            };
            log::debug!("Sequence number: {number:?}");
            MetaEvent::SequenceNumber(number)
        }
        META_TEXT => {
            let text = make_string(payload);
            log::debug!("Text: {text}");
            MetaEvent::Text(text)
        }
        META_COPYRIGHT => {
            let text = make_string(payload);
            log::debug!("Copyright: {text}");
            MetaEvent::Copyright(text)
        }
        META_TRACK_NAME => {
            let text = make_string(payload);
            log::debug!("Track name: {text}");
            MetaEvent::TrackName(text)
        }
        META_INSTRUMENT_NAME => {
            let text = make_string(payload);
            log::debug!("Instrument name: {text}");
            MetaEvent::InstrumentName(text)
        }
        META_LYRICS => {
            let text = make_string(payload);
            log::debug!("Lyrics: {text}");
            MetaEvent::Lyric(text)
        }
        META_MARKER => {
            let text = make_string(payload);
            log::debug!("Marker: {text}");
            MetaEvent::Marker(text)
        }
        META_CUE_POINT => {
            let text = make_string(payload);
            log::debug!("Cue: {text}");
            MetaEvent::CuePoint(text)
        }
        META_CHANNEL_PREFIX => match payload {
            [channel, ..] => {
                log::debug!("Channel prefix: {channel}");
                MetaEvent::ChannelPrefix(*channel)
            }
            _ => MetaEvent::Malformed { kind, length },
        },
        META_SET_TEMPO => match payload {
            [a, b, c, ..] => {
                let tempo = u32::from_be_bytes([0, *a, *b, *c]);
                log::debug!("Tempo: {tempo}");
                MetaEvent::Tempo(tempo)
            }
            _ => MetaEvent::Malformed { kind, length },
        },
        META_SMPTE_OFFSET => match payload {
            [hours, minutes, seconds, frames, subframes, ..] => {
                let offset = SmpteOffset {
                    hours: *hours,
                    minutes: *minutes,
                    seconds: *seconds,
                    frames: *frames,
                    subframes: *subframes,
                };
                log::debug!("SMPTE offset: {offset:?}");
                MetaEvent::SmpteOffset(offset)
            }
            _ => MetaEvent::Malformed { kind, length },
        },
        META_TIME_SIGNATURE => match payload {
            [numerator, denominator_power, clocks_per_click, thirty_seconds, ..] => {
                let signature = TimeSignature {
                    numerator: *numerator,
                    denominator_power: *denominator_power,
                    clocks_per_click: *clocks_per_click,
                    thirty_seconds_per_quarter: *thirty_seconds,
                };
                log::debug!("Time signature: {signature:?}");
                MetaEvent::TimeSignature(signature)
            }
            _ => MetaEvent::Malformed { kind, length },
        },
        META_KEY_SIGNATURE => match payload {
            [sharps_flats, minor, ..] => {
                let signature = KeySignature {
                    sharps_flats: i8::from_be_bytes([*sharps_flats]),
                    minor: *minor == 1,
                };
                log::debug!("Key signature: {signature:?}");
                MetaEvent::KeySignature(signature)
            }
            _ => MetaEvent::Malformed { kind, length },
        },
        META_SEQUENCER_SPECIFIC => {
            log::debug!("Sequencer specific: {length} bytes");
            MetaEvent::SequencerSpecific { length }
        }
        _ => {
            log::warn!("Unrecognized meta event type:{kind:02X} length:{length}");
            MetaEvent::Unknown { kind, length }
        }
    };
    if let MetaEvent::Malformed { kind, length } = meta {
        log::warn!("Malformed meta event type:{kind:02X} length:{length}");
    }
    Ok(Some(meta))
}
