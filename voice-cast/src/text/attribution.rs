//! Attribution cues: recovering a speaker name from the text around a quote.

use once_cell::sync::Lazy;
use regex::Regex;

/// Characters after a closing quote searched for a comma-led cue.
pub const INLINE_WINDOW: usize = 50;

/// Characters after a closing quote searched for an anchored cue.
pub const POST_QUOTE_WINDOW: usize = 100;

/// `, Mary said` anywhere in the window.
static INLINE_CUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i),\s*(\w+)\s*(?:said|asked|shouted|replied)").expect("valid inline cue regex")
});

/// ` Mary said` at the very start of the window.
static POST_QUOTE_CUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(\w+)\s*(?:said|asked|shouted|replied)")
        .expect("valid post-quote cue regex")
});

/// `Tom said, ` at the very end of the text preceding a quote.
static LEAD_IN_CUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(\w+)\s+(?:said|asked|shouted|replied),\s*$")
        .expect("valid lead-in cue regex")
});

/// Words that fill the name slot of a lead-in cue without naming anyone.
const NOT_NAMES: &[&str] = &[
    "i", "you", "he", "she", "it", "we", "they", "nobody", "somebody", "someone", "everyone",
    "everybody", "anyone", "no", "one", "who",
];

/// A speaker recovered after a quote, and how much text the cue consumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cue {
    pub speaker: String,
    /// Bytes consumed, measured from the start of the searched window
    pub consumed: usize,
}

/// Slice at most `max_chars` characters of `text` starting at byte `start`,
/// never reaching past byte `limit`.
pub fn window(text: &str, start: usize, max_chars: usize, limit: usize) -> &str {
    let rest = &text[start..limit];
    let end = rest
        .char_indices()
        .nth(max_chars)
        .map(|(i, _)| i)
        .unwrap_or(rest.len());
    &rest[..end]
}

/// Search for a comma-led cue such as `, Mary said`.
pub fn inline_cue(window: &str) -> Option<Cue> {
    capture_cue(&INLINE_CUE, window)
}

/// Match a cue such as ` Mary said` right at the start of the window.
pub fn post_quote_cue(window: &str) -> Option<Cue> {
    capture_cue(&POST_QUOTE_CUE, window)
}

/// Find a proper-name lead-in such as `Tom said, ` ending the preceding text.
///
/// Pronouns are rejected: a lead-in pronoun refers back to a speaker that
/// propagation already carries.
pub fn lead_in_speaker(preceding: &str) -> Option<String> {
    let caps = LEAD_IN_CUE.captures(preceding)?;
    let name = caps.get(1)?.as_str();

    let capitalized = name.chars().next().is_some_and(char::is_uppercase);
    let not_a_name = NOT_NAMES.contains(&name.to_lowercase().as_str());

    (capitalized && !not_a_name).then(|| name.to_string())
}

fn capture_cue(pattern: &Regex, window: &str) -> Option<Cue> {
    let caps = pattern.captures(window)?;
    let whole = caps.get(0)?;
    let speaker = caps.get(1)?.as_str().to_string();

    Some(Cue {
        speaker,
        consumed: whole.end(),
    })
}
