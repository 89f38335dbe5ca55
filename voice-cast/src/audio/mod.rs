//! Audio export: per-chunk files and their concatenation into one MP3.

pub mod assembler;

pub use assembler::{ChunkLayout, concatenate_mp3, is_ffmpeg_available};
