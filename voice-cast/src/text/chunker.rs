//! Size-bounded chunking of segments at sentence boundaries.

use super::{Chunk, Segment};
use once_cell::sync::Lazy;
use regex::Regex;

/// Default maximum chunk size in characters.
pub const DEFAULT_MAX_CHARS: usize = 3000;

/// Terminal punctuation followed by the whitespace run that separates sentences.
static SENTENCE_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.?!]\s+").expect("valid sentence break regex"));

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Split text after `.`, `?` or `!` followed by whitespace.
///
/// Punctuation stays with its sentence; the separating whitespace is dropped.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;

    for m in SENTENCE_BREAK.find_iter(text) {
        // All terminators are one byte wide.
        sentences.push(&text[start..m.start() + 1]);
        start = m.end();
    }
    sentences.push(&text[start..]);

    sentences.retain(|s| !s.is_empty());
    sentences
}

/// Split one segment into chunks of at most `max_chars` characters.
///
/// Sentences are packed greedily. A single sentence longer than `max_chars`
/// is kept whole as an oversized chunk.
pub fn chunk_segment(segment: &Segment, max_chars: usize) -> Vec<Chunk> {
    let max_chars = max_chars.max(1);
    let make = |text: String| Chunk::new(segment.speaker.clone(), text, segment.kind);

    if segment.text.is_empty() {
        return Vec::new();
    }

    if char_len(&segment.text) <= max_chars {
        return vec![make(segment.text.clone())];
    }

    let mut chunks = Vec::new();
    let mut buffer = String::new();
    let mut buffer_len = 0;

    for sentence in split_sentences(&segment.text) {
        let sentence_len = char_len(sentence);

        if buffer_len + sentence_len + 1 > max_chars {
            flush(&mut buffer, &mut chunks, &make, max_chars);
            buffer_len = 0;
        }

        buffer.push_str(sentence);
        buffer.push(' ');
        buffer_len += sentence_len + 1;
    }

    flush(&mut buffer, &mut chunks, &make, max_chars);
    chunks
}

fn flush(
    buffer: &mut String,
    chunks: &mut Vec<Chunk>,
    make: &impl Fn(String) -> Chunk,
    max_chars: usize,
) {
    let text = buffer.trim();
    if !text.is_empty() {
        let len = char_len(text);
        if len > max_chars {
            log::debug!("Keeping oversized sentence as one chunk ({len} > {max_chars} chars)");
        }
        chunks.push(make(text.to_string()));
    }
    buffer.clear();
}

/// Chunk every segment in order and flatten the result.
pub fn chunk_segments(segments: &[Segment], max_chars: usize) -> Vec<Chunk> {
    segments
        .iter()
        .flat_map(|segment| chunk_segment(segment, max_chars))
        .collect()
}
