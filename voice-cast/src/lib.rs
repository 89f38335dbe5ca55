//! voice-cast - Turn narrative text into a multi-voice audiobook.
//!
//! Text is split into narration and dialogue, each quote is attributed to a
//! speaker, speakers are given distinct voices, and size-bounded chunks are
//! synthesized and concatenated into one MP3.

pub mod audio;
pub mod config;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod text;
pub mod tts;
pub mod voice;
