use crate::parser::primitive_parser::{
    parse_string, parse_tag, parse_u16_be, parse_u32_be, parse_u8, parse_vlq,
};
use crate::SmfError;
use nom::{bytes, Parser};

/// Sequential reader over an immutable byte buffer.
///
/// Every read goes through a `nom` parser applied to the unread part of the buffer,
/// a failed read leaves the position untouched.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> ByteCursor<'a> {
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    pub const fn position(&self) -> usize {
        self.position
    }

    pub const fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    pub const fn at_end(&self) -> bool {
        self.position >= self.data.len()
    }

    /// Run `parser` on the unread bytes and advance past what it consumed.
    pub fn parse<T, P>(&mut self, mut parser: P) -> Result<T, SmfError>
    where
        P: Parser<&'a [u8], Output = T, Error = nom::error::Error<&'a [u8]>>,
    {
        let input = self.data.get(self.position..).unwrap_or(&[]);
        match parser.parse(input) {
            Ok((rest, value)) => {
                self.position = self.data.len() - rest.len();
                Ok(value)
            }
            Err(_) => Err(SmfError::TruncatedInput {
                position: self.position,
            }),
        }
    }

    pub fn read_u8(&mut self) -> Result<u8, SmfError> {
        self.parse(parse_u8)
    }

    pub fn read_u16_be(&mut self) -> Result<u16, SmfError> {
        self.parse(parse_u16_be)
    }

    pub fn read_u32_be(&mut self) -> Result<u32, SmfError> {
        self.parse(parse_u32_be)
    }

    pub fn read_vlq(&mut self) -> Result<u32, SmfError> {
        self.parse(parse_vlq)
    }

    pub fn read_tag(&mut self) -> Result<[u8; 4], SmfError> {
        self.parse(parse_tag)
    }

    /// Borrow the next `len` bytes.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], SmfError> {
        self.parse(bytes::complete::take(len))
    }

    pub fn read_string(&mut self, len: usize) -> Result<String, SmfError> {
        self.parse(parse_string(len))
    }

    /// Step back over the last byte read.
    pub fn unread_one(&mut self) -> Result<(), SmfError> {
        self.position = self
            .position
            .checked_sub(1)
            .ok_or(SmfError::InvalidRewind)?;
        Ok(())
    }
}
