//! Decoding policies

use serde::{Deserialize, Serialize};

/// What to do when the buffer ends in the middle of a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TruncationPolicy {
    /// Keep the events decoded so far and end the track
    #[default]
    Tolerate,
    /// Abort the decode with `SmfError::TruncatedInput`
    Fail,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeOptions {
    pub truncation: TruncationPolicy,
    /// Reject formats other than 0, 1 and 2
    pub validate_format: bool,
    /// Require the `MThd` and `MTrk` chunk tags
    pub strict_chunk_ids: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            truncation: TruncationPolicy::Tolerate,
            validate_format: true,
            strict_chunk_ids: false,
        }
    }
}

impl DecodeOptions {
    pub fn tolerates_truncation(&self) -> bool {
        self.truncation == TruncationPolicy::Tolerate
    }
}
