use encoding_rs::WINDOWS_1252;
use nom::combinator::map;
use nom::{bytes, number, IResult, Parser};

/// Parse unsigned byte
pub fn parse_u8(i: &[u8]) -> IResult<&[u8], u8> {
    number::complete::be_u8(i)
}

/// Parse big-endian unsigned 16
pub fn parse_u16_be(i: &[u8]) -> IResult<&[u8], u16> {
    number::complete::be_u16(i)
}

/// Parse big-endian unsigned 32
pub fn parse_u32_be(i: &[u8]) -> IResult<&[u8], u32> {
    number::complete::be_u32(i)
}

/// Parse a 4 bytes chunk tag such as `MThd` or `MTrk`
pub fn parse_tag(i: &[u8]) -> IResult<&[u8], [u8; 4]> {
    map(bytes::complete::take(4usize), |tag: &[u8]| {
        [tag[0], tag[1], tag[2], tag[3]]
    })
    .parse(i)
}

/// Parse a variable-length quantity.
///
/// 7 bits of payload per byte, most significant group first, bit 7 set on every byte but the last.
/// There is no ceiling on the number of bytes, bits shifted past 32 are lost.
pub fn parse_vlq(i: &[u8]) -> IResult<&[u8], u32> {
    let (mut i, first) = parse_u8(i)?;
    let mut value = u32::from(first);
    if first & 0x80 != 0 {
        value &= 0x7F;
        loop {
            let (rest, byte) = parse_u8(i)?;
            i = rest;
            value = (value << 7) | u32::from(byte & 0x7F);
            if byte & 0x80 == 0 {
                break;
            }
        }
    }
    Ok((i, value))
}

/// Materialize properly encoded String
///
/// SMF text events carry no encoding, Windows-1252 is the most common in the wild.
/// Valid UTF-8 payloads are kept as is, anything else is read as Windows-1252 which maps every byte.
pub fn make_string(i: &[u8]) -> String {
    if let Ok(s) = std::str::from_utf8(i) {
        return s.to_string();
    }
    let (cow, _encoding_used, _had_errors) = WINDOWS_1252.decode(i);
    cow.into_owned()
}

/// Parse string of length `len`.
pub fn parse_string(len: usize) -> impl FnMut(&[u8]) -> IResult<&[u8], String> {
    move |i: &[u8]| map(bytes::complete::take(len), make_string).parse(i)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_vlq(mut value: u32) -> Vec<u8> {
        let mut out = vec![(value & 0x7F) as u8];
        value >>= 7;
        while value > 0 {
            out.push(((value & 0x7F) as u8) | 0x80);
            value >>= 7;
        }
        out.reverse();
        out
    }

    #[test]
    fn test_parse_vlq_single_byte() {
        let (rest, value) = parse_vlq(&[0x40, 0x01]).unwrap();
        assert_eq!(value, 0x40);
        assert_eq!(rest, &[0x01]);
    }

    #[test]
    fn test_parse_vlq_three_bytes() {
        let (rest, value) = parse_vlq(&[0x81, 0x80, 0x00]).unwrap();
        assert_eq!(value, 0x4000);
        assert!(rest.is_empty());
    }

    #[test]
    fn test_parse_vlq_max_four_bytes() {
        let (_rest, value) = parse_vlq(&[0xFF, 0xFF, 0xFF, 0x7F]).unwrap();
        assert_eq!(value, 0x0FFF_FFFF);
    }

    #[test]
    fn test_parse_vlq_five_bytes() {
        let data = [0x81, 0x80, 0x80, 0x80, 0x00, 0x7F];
        let (rest, value) = parse_vlq(&data).unwrap();
        assert_eq!(value, 0x1000_0000);
        assert_eq!(rest, &[0x7F]);

        let (rest, value) = parse_vlq(&[0x8F, 0xFF, 0xFF, 0xFF, 0x7F]).unwrap();
        assert_eq!(value, 0xFFFF_FFFF);
        assert!(rest.is_empty());
    }

    #[test]
    fn test_parse_vlq_drops_bits_past_32() {
        let data = [0x81, 0x80, 0x80, 0x80, 0x80, 0x00];
        let (rest, value) = parse_vlq(&data).unwrap();
        assert_eq!(value, 0);
        assert!(rest.is_empty());
    }

    #[test]
    fn test_vlq_round_trip_boundaries() {
        for value in [
            0,
            0x7F,
            0x80,
            0x2000,
            0x3FFF,
            0x4000,
            0x001F_FFFF,
            0x0020_0000,
            0x0FFF_FFFF,
        ] {
            let encoded = encode_vlq(value);
            assert!(encoded.len() <= 4);
            let (rest, decoded) = parse_vlq(&encoded).unwrap();
            assert_eq!(decoded, value, "encoded as {encoded:02X?}");
            assert!(rest.is_empty());
        }
    }

    #[test]
    fn test_parse_vlq_truncated() {
        assert!(parse_vlq(&[0x81, 0x80]).is_err());
        assert!(parse_vlq(&[]).is_err());
    }

    #[test]
    fn test_parse_big_endian() {
        let data = [0x00, 0x00, 0x00, 0x06, 0x01, 0xE0];
        let (rest, length) = parse_u32_be(&data).unwrap();
        assert_eq!(length, 6);
        let (rest, division) = parse_u16_be(rest).unwrap();
        assert_eq!(division, 480);
        assert!(rest.is_empty());
    }

    #[test]
    fn test_parse_tag() {
        let (rest, tag) = parse_tag(b"MTrk\x00").unwrap();
        assert_eq!(&tag, b"MTrk");
        assert_eq!(rest, &[0x00]);
        assert!(parse_tag(b"MTr").is_err());
    }

    #[test]
    fn test_parse_string_windows_1252() {
        // "Café" with a Windows-1252 e-acute
        let data = [0x43, 0x61, 0x66, 0xE9, 0xFF];
        let (rest, s) = parse_string(4)(&data).unwrap();
        assert_eq!(s, "Café");
        assert_eq!(rest, &[0xFF]);
    }

    #[test]
    fn test_parse_string_utf8() {
        let data = "Piano ♪".as_bytes();
        let (_rest, s) = parse_string(data.len())(data).unwrap();
        assert_eq!(s, "Piano ♪");
    }

    #[test]
    fn test_make_string_windows_1252_quotes() {
        assert_eq!(make_string(&[0x93, b'H', b'i', 0x94]), "\u{201C}Hi\u{201D}");
    }
}
