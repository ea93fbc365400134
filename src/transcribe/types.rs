// Transcription data model.

use serde::{Deserialize, Serialize};

/// A time-stamped piece of recognized speech. Ordered by start time and
/// immutable once produced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TranscriptSegment {
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
    pub text: String,
}

/// A transcript segment after speaker attribution. Its time span is always
/// the span of exactly one transcript segment; the speaker comes from the
/// diarization interval with the greatest temporal overlap, when one exists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Utterance {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
    pub start: f64,
    pub end: f64,
    pub text: String,
}
