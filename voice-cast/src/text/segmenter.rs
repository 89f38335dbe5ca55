//! Dialogue segmentation with speaker attribution and propagation.
//!
//! The input is partitioned into narration, dialogue, and attribution cue
//! segments in a single forward scan. A second pass carries the last known
//! speaker onto dialogue that had no cue of its own.

use super::attribution::{self, INLINE_WINDOW, POST_QUOTE_WINDOW, window};
use super::Segment;
use crate::error::ConfigError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// A pair of quotation delimiters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteStyle {
    pub open: char,
    pub close: char,
}

impl QuoteStyle {
    /// Straight double quotes: `"..."`.
    pub const STRAIGHT: QuoteStyle = QuoteStyle {
        open: '"',
        close: '"',
    };

    /// Typographic double quotes: `“...”`.
    pub const CURLY: QuoteStyle = QuoteStyle {
        open: '\u{201c}',
        close: '\u{201d}',
    };

    /// Pattern for one quoted span: opener, one or more non-closers, closer.
    fn pattern(&self) -> String {
        let open = regex::escape(&self.open.to_string());
        let close = regex::escape(&self.close.to_string());
        format!("{open}[^{close}]+{close}")
    }
}

/// Tunable segmentation behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmenterOptions {
    /// Fall back to a `Name said,` cue before the quote
    #[serde(default = "default_lead_in")]
    pub lead_in_attribution: bool,

    /// Quotation delimiters recognized as dialogue
    #[serde(default = "default_quotes")]
    pub quotes: Vec<QuoteStyle>,
}

fn default_quotes() -> Vec<QuoteStyle> {
    vec![QuoteStyle::STRAIGHT, QuoteStyle::CURLY]
}

fn default_lead_in() -> bool {
    true
}

impl Default for SegmenterOptions {
    fn default() -> Self {
        Self {
            lead_in_attribution: default_lead_in(),
            quotes: default_quotes(),
        }
    }
}

/// Splits text into speaker-tagged segments.
#[derive(Debug, Clone)]
pub struct Segmenter {
    quote_pattern: Regex,
    options: SegmenterOptions,
}

static DEFAULT_SEGMENTER: Lazy<Segmenter> = Lazy::new(|| {
    Segmenter::new(SegmenterOptions::default()).expect("default quote styles should compile")
});

/// Segment text with the default quote styles.
pub fn segment(text: &str) -> Vec<Segment> {
    DEFAULT_SEGMENTER.segment(text)
}

impl Segmenter {
    /// Build a segmenter for the given options.
    pub fn new(options: SegmenterOptions) -> Result<Self, ConfigError> {
        if options.quotes.is_empty() {
            return Err(ConfigError::NoQuoteStyles);
        }

        let alternatives: Vec<String> = options.quotes.iter().map(QuoteStyle::pattern).collect();
        let quote_pattern = Regex::new(&alternatives.join("|"))?;

        Ok(Self {
            quote_pattern,
            options,
        })
    }

    /// Partition `text` into an ordered, gap-free list of segments.
    pub fn segment(&self, text: &str) -> Vec<Segment> {
        let quotes: Vec<Range<usize>> = self
            .quote_pattern
            .find_iter(text)
            .map(|m| m.range())
            .collect();

        let mut segments = Vec::with_capacity(quotes.len() * 3 + 1);
        let mut last = 0;

        for (i, quote) in quotes.iter().enumerate() {
            // Cue windows stop at the next quote, so `last` never passes it.
            let preceding = &text[last..quote.start];
            if !preceding.is_empty() {
                segments.push(Segment::narration(preceding));
            }

            let limit = quotes.get(i + 1).map_or(text.len(), |next| next.start);
            let cue = attribution::inline_cue(window(text, quote.end, INLINE_WINDOW, limit))
                .or_else(|| {
                    attribution::post_quote_cue(window(text, quote.end, POST_QUOTE_WINDOW, limit))
                });

            let (speaker, cue_end) = match cue {
                Some(cue) => (Some(cue.speaker), quote.end + cue.consumed),
                None if self.options.lead_in_attribution => {
                    (attribution::lead_in_speaker(preceding), quote.end)
                }
                None => (None, quote.end),
            };

            segments.push(Segment::dialogue(speaker, &text[quote.clone()]));
            if cue_end > quote.end {
                segments.push(Segment::attribution(&text[quote.end..cue_end]));
            }
            last = cue_end;
        }

        if last < text.len() {
            segments.push(Segment::narration(&text[last..]));
        }

        log::debug!(
            "Segmented {} chars into {} segments ({} quotes)",
            text.len(),
            segments.len(),
            quotes.len()
        );

        propagate_speakers(segments)
    }
}

/// Carry the most recent resolved speaker onto unattributed dialogue.
fn propagate_speakers(segments: Vec<Segment>) -> Vec<Segment> {
    segments
        .into_iter()
        .scan(None::<String>, |last_known, mut segment| {
            if segment.is_dialogue() {
                match &segment.speaker {
                    Some(speaker) => *last_known = Some(speaker.clone()),
                    None => segment.speaker = last_known.clone(),
                }
            }
            Some(segment)
        })
        .collect()
}
