//! Error types for the smf-notes library

use std::io;

/// Library error type for smf-notes operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SmfError {
    /// The buffer ran out in the middle of a read
    #[error("truncated input: read past end of buffer at byte {position}")]
    TruncatedInput { position: usize },

    /// The 14 bytes file header could not be read
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// Format field outside of the three SMF formats
    #[error("unsupported SMF format: {0}")]
    UnsupportedFormat(u16),

    /// Track chunk tag is not `MTrk` (strict chunk ids only)
    #[error("invalid chunk id {found:02X?} at byte {position}")]
    InvalidChunkId { position: usize, found: [u8; 4] },

    /// Attempt to rewind a cursor sitting at the start of its buffer
    #[error("cannot rewind before the start of the buffer")]
    InvalidRewind,

    /// Configuration error
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(String),
}

impl SmfError {
    pub const fn is_truncated(&self) -> bool {
        matches!(self, Self::TruncatedInput { .. })
    }
}

impl From<io::Error> for SmfError {
    fn from(error: io::Error) -> Self {
        Self::IoError(error.to_string())
    }
}
