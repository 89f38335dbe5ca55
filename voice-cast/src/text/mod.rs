//! Text processing: dialogue segmentation, speaker attribution, and chunking.

mod attribution;
pub mod chunker;
pub mod segmenter;

pub use chunker::{chunk_segment, chunk_segments};
pub use segmenter::{QuoteStyle, Segmenter, SegmenterOptions, segment};

use serde::{Deserialize, Serialize};

/// What a segment of text represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    /// Text bounded by quotation delimiters.
    Dialogue,
    /// Text outside quotation delimiters.
    Narration,
    /// An attribution cue consumed after a quote (e.g. ` Mary said`).
    Attribution,
}

/// A contiguous piece of the input text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// The speaker of a dialogue segment; always `None` for other kinds
    pub speaker: Option<String>,
    /// The exact text slice from the input
    pub text: String,
    pub kind: SegmentKind,
}

impl Segment {
    /// Create a narration segment.
    pub fn narration(text: impl Into<String>) -> Self {
        Self {
            speaker: None,
            text: text.into(),
            kind: SegmentKind::Narration,
        }
    }

    /// Create a dialogue segment with an optional speaker.
    pub fn dialogue(speaker: Option<String>, text: impl Into<String>) -> Self {
        Self {
            speaker,
            text: text.into(),
            kind: SegmentKind::Dialogue,
        }
    }

    /// Create an attribution cue segment.
    pub fn attribution(text: impl Into<String>) -> Self {
        Self {
            speaker: None,
            text: text.into(),
            kind: SegmentKind::Attribution,
        }
    }

    pub fn is_dialogue(&self) -> bool {
        self.kind == SegmentKind::Dialogue
    }
}

/// A size-bounded piece of a segment, ready for synthesis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Speaker inherited from the source segment
    pub speaker: Option<String>,
    /// The text content
    pub text: String,
    /// Kind of the source segment
    pub kind: SegmentKind,
}

impl Chunk {
    /// Create a new chunk.
    pub fn new(speaker: Option<String>, text: String, kind: SegmentKind) -> Self {
        Self {
            speaker,
            text,
            kind,
        }
    }

    /// Label used in logs and plans.
    pub fn speaker_label(&self) -> &str {
        self.speaker.as_deref().unwrap_or("Narrator")
    }
}
