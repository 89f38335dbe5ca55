//! MP3 assembly using FFmpeg.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn ffmpeg_command() -> Command {
    Command::new(std::env::var("FFMPEG").unwrap_or_else(|_| "ffmpeg".to_string()))
}

/// Where the per-chunk and partial files of an output live.
///
/// For `book.mp3` the chunks go to `book_chunks/seg_0001.mp3` and an
/// interrupted run leaves `book_partial.mp3`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkLayout {
    pub output: PathBuf,
    pub chunk_dir: PathBuf,
    pub partial: PathBuf,
}

impl ChunkLayout {
    pub fn for_output(output: &Path) -> Self {
        let stem = output
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audiobook".to_string());
        let parent = output.parent().unwrap_or_else(|| Path::new(""));

        Self {
            output: output.to_path_buf(),
            chunk_dir: parent.join(format!("{stem}_chunks")),
            partial: parent.join(format!("{stem}_partial.mp3")),
        }
    }

    /// Path of the audio for the chunk at `index` (0-based, numbered from 1 on disk).
    pub fn chunk_path(&self, index: usize) -> PathBuf {
        self.chunk_dir.join(format!("seg_{:04}.mp3", index + 1))
    }
}

/// Concatenate MP3 files, in order, into `output_path`.
///
/// Uses FFmpeg's concat demuxer with stream copy; a single file is copied.
pub fn concatenate_mp3(audio_files: &[PathBuf], output_path: &Path) -> Result<()> {
    if audio_files.is_empty() {
        anyhow::bail!("No audio files provided");
    }

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    if audio_files.len() == 1 {
        std::fs::copy(&audio_files[0], output_path).with_context(|| {
            format!("Failed to copy {} to {}", audio_files[0].display(), output_path.display())
        })?;
        return Ok(());
    }

    let temp_dir = TempDir::new()?;
    let list_file = temp_dir.path().join("concat_list.txt");
    std::fs::write(&list_file, concat_list(audio_files)?)?;

    log::debug!(
        "Concatenating {} files into {}",
        audio_files.len(),
        output_path.display()
    );

    let output = ffmpeg_command()
        .args(["-y", "-loglevel", "error", "-f", "concat", "-safe", "0", "-i"])
        .arg(&list_file)
        .args(["-c", "copy"])
        .arg(output_path)
        .output()
        .context("Failed to run ffmpeg concat")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!("ffmpeg concat failed: {}", stderr);
    }

    Ok(())
}

/// Build the concat demuxer file list with absolute, quote-escaped paths.
fn concat_list(audio_files: &[PathBuf]) -> Result<String> {
    let mut list = String::new();
    for path in audio_files {
        let path = std::path::absolute(path)
            .with_context(|| format!("Failed to resolve {}", path.display()))?;
        let escaped = path.to_string_lossy().replace('\'', "'\\''");
        list.push_str(&format!("file '{}'\n", escaped));
    }
    Ok(list)
}

/// Check if FFmpeg is available on the PATH (or via `$FFMPEG`).
pub fn is_ffmpeg_available() -> bool {
    ffmpeg_command()
        .arg("-version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}
