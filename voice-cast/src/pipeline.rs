//! Orchestration: text to voiced chunk plan, plan to audio files.

use crate::audio::{ChunkLayout, concatenate_mp3};
use crate::config::VoiceCastConfig;
use crate::error::ConfigError;
use crate::text::{Chunk, SegmentKind, Segmenter, chunk_segments};
use crate::tts::TtsBackend;
use crate::voice::{Gender, VoiceResolver};
use anyhow::{Context, Result};
use futures_util::stream::{self, StreamExt};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// A chunk with the voice that will speak it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoicedChunk {
    /// Position in the rendered audiobook (0-based)
    pub index: usize,
    pub speaker: Option<String>,
    pub gender: Option<Gender>,
    pub voice: String,
    pub kind: SegmentKind,
    pub text: String,
}

impl VoicedChunk {
    pub fn speaker_label(&self) -> &str {
        self.speaker.as_deref().unwrap_or("Narrator")
    }
}

/// Turns text into the ordered list of chunks to synthesize.
#[derive(Debug, Clone)]
pub struct Planner {
    segmenter: Segmenter,
    max_chars: usize,
    narrate_attributions: bool,
}

impl Planner {
    pub fn new(segmenter: Segmenter, max_chars: usize) -> Self {
        Self {
            segmenter,
            max_chars: max_chars.max(1),
            narrate_attributions: false,
        }
    }

    pub fn from_config(config: &VoiceCastConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(config.segmenter()?, config.max_chars)
            .with_narrated_attributions(config.narrate_attributions))
    }

    /// Voice attribution cues with the narrator instead of dropping them.
    pub fn with_narrated_attributions(mut self, narrate: bool) -> Self {
        self.narrate_attributions = narrate;
        self
    }

    /// Segment and chunk `text`, keeping only chunks that will be spoken.
    pub fn chunks(&self, text: &str) -> Vec<Chunk> {
        let segments = self.segmenter.segment(text);
        chunk_segments(&segments, self.max_chars)
            .into_iter()
            .filter(|chunk| !chunk.text.trim().is_empty())
            .filter(|chunk| self.narrate_attributions || chunk.kind != SegmentKind::Attribution)
            .collect()
    }

    /// Build the voiced plan, assigning voices in order of first appearance.
    pub fn plan(&self, text: &str, resolver: &mut VoiceResolver) -> Vec<VoicedChunk> {
        self.chunks(text)
            .into_iter()
            .enumerate()
            .map(|(index, chunk)| {
                let assignment = resolver.resolve(chunk.speaker.as_deref());
                VoicedChunk {
                    index,
                    speaker: chunk.speaker,
                    gender: assignment.gender,
                    voice: assignment.voice.clone(),
                    kind: chunk.kind,
                    text: chunk.text,
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Synthesis requests in flight at once
    pub concurrency: usize,
    /// Attempts per chunk, including the first
    pub max_attempts: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            concurrency: 4,
            max_attempts: 3,
        }
    }
}

/// Outcome of rendering a plan.
#[derive(Debug, Clone, Default)]
pub struct RenderReport {
    /// Chunk audio files in plan order
    pub files: Vec<PathBuf>,
}

/// Synthesize every chunk into `layout.chunk_dir`, preserving plan order.
///
/// Up to `concurrency` requests run at once but files are collected in plan
/// order. Each time a chunk completes, the completed prefix is re-exported to
/// `layout.partial`, so an interrupted or failed run still leaves playable
/// audio behind. Every run synthesizes every chunk.
pub async fn render(
    backend: &dyn TtsBackend,
    chunks: &[VoicedChunk],
    layout: &ChunkLayout,
    options: &RenderOptions,
    on_progress: impl Fn(usize),
) -> Result<RenderReport> {
    tokio::fs::create_dir_all(&layout.chunk_dir)
        .await
        .with_context(|| format!("Failed to create {}", layout.chunk_dir.display()))?;
    if layout.partial.exists() {
        tokio::fs::remove_file(&layout.partial)
            .await
            .with_context(|| format!("Failed to remove {}", layout.partial.display()))?;
    }

    let mut results = stream::iter(chunks)
        .map(move |chunk| async move {
            let audio = backend
                .synthesize_with_retry(&chunk.text, &chunk.voice, options.max_attempts)
                .await
                .with_context(|| {
                    format!(
                        "Failed to synthesize chunk {} ({}, {})",
                        chunk.index + 1,
                        chunk.speaker_label(),
                        chunk.voice
                    )
                })?;

            let path = layout.chunk_path(chunk.index);
            tokio::fs::write(&path, audio)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            Ok::<_, anyhow::Error>(path)
        })
        .buffered(options.concurrency.max(1));

    let mut report = RenderReport::default();
    while let Some(result) = results.next().await {
        match result {
            Ok(path) => {
                report.files.push(path);
                update_partial(&report.files, &layout.partial);
                on_progress(report.files.len());
            }
            Err(e) => {
                if layout.partial.exists() {
                    log::warn!(
                        "Saved {} completed chunks to {}",
                        report.files.len(),
                        layout.partial.display()
                    );
                }
                return Err(e);
            }
        }
    }

    log::info!("Rendered {} chunks", report.files.len());
    Ok(report)
}

fn update_partial(files: &[PathBuf], partial: &Path) {
    if let Err(e) = concatenate_mp3(files, partial) {
        log::debug!("Failed to update partial audio: {:#}", e);
    }
}

/// Concatenate the rendered chunks into the final output file.
pub fn export(report: &RenderReport, layout: &ChunkLayout) -> Result<()> {
    concatenate_mp3(&report.files, &layout.output)
        .with_context(|| format!("Failed to assemble {}", layout.output.display()))?;

    if layout.partial.exists() {
        std::fs::remove_file(&layout.partial)
            .with_context(|| format!("Failed to remove {}", layout.partial.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{TtsError, TtsResult};
    use crate::text::SegmenterOptions;
    use crate::voice::{NameDictionary, VoicePool};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records calls and returns `<prefix><voice>|<text>` as the "audio".
    #[derive(Default)]
    struct RecordingBackend {
        calls: Mutex<Vec<(String, String)>>,
        prefix: &'static str,
        fail_on: Option<&'static str>,
    }

    #[async_trait]
    impl TtsBackend for RecordingBackend {
        async fn synthesize(&self, text: &str, voice: &str) -> TtsResult<Vec<u8>> {
            self.calls
                .lock()
                .unwrap()
                .push((voice.to_string(), text.to_string()));
            if self.fail_on.is_some_and(|needle| text.contains(needle)) {
                return Err(TtsError::ApiError {
                    message: "rejected".to_string(),
                    status_code: Some(400),
                });
            }
            Ok(format!("{}{voice}|{text}", self.prefix).into_bytes())
        }

        fn name(&self) -> &'static str {
            "recording"
        }
    }

    fn planner() -> Planner {
        Planner::new(Segmenter::new(SegmenterOptions::default()).unwrap(), 3000)
    }

    fn resolver() -> VoiceResolver {
        let pool = VoicePool::new(
            vec!["male-1".to_string()],
            vec!["female-1".to_string()],
            Some("narrator".to_string()),
        )
        .unwrap();
        VoiceResolver::new(pool, NameDictionary::builtin())
    }

    const STORY: &str =
        r#"The rain stopped. "Come in," Mary said. "Thanks." Tom nodded. "It is late," Tom replied."#;

    #[test]
    fn test_plan_assigns_voices() {
        let plan = planner().plan(STORY, &mut resolver());
        let summary: Vec<_> = plan
            .iter()
            .map(|c| (c.index, c.speaker_label(), c.voice.as_str(), c.text.as_str()))
            .collect();

        assert_eq!(
            summary,
            vec![
                (0, "Narrator", "narrator", "The rain stopped. "),
                (1, "Mary", "female-1", "\"Come in,\""),
                (2, "Narrator", "narrator", ". "),
                (3, "Mary", "female-1", "\"Thanks.\""),
                (4, "Narrator", "narrator", " Tom nodded. "),
                (5, "Tom", "male-1", "\"It is late,\""),
                (6, "Narrator", "narrator", "."),
            ]
        );
    }

    #[test]
    fn test_plan_can_narrate_attributions() {
        let planner = planner().with_narrated_attributions(true);
        let plan = planner.plan(STORY, &mut resolver());
        let cue = plan
            .iter()
            .find(|c| c.kind == SegmentKind::Attribution)
            .unwrap();
        assert_eq!(cue.text, " Mary said");
        assert_eq!(cue.voice, "narrator");
        assert_eq!(plan.len(), 9);
    }

    #[test]
    fn test_plan_skips_blank_chunks() {
        let plan = planner().plan(r#""Run!" "Wait!""#, &mut resolver());
        assert_eq!(plan.len(), 2);
        assert!(plan.iter().all(|c| c.voice == "narrator"));
    }

    #[test]
    fn test_plan_empty_text() {
        assert!(planner().plan("", &mut resolver()).is_empty());
    }

    #[test]
    fn test_planner_from_config() {
        let mut config = VoiceCastConfig::default();
        config.max_chars = 10;
        config.narrate_attributions = true;
        let planner = Planner::from_config(&config).unwrap();
        let chunks = planner.chunks("One two. Three four.");
        assert_eq!(chunks.len(), 2);
    }

    #[tokio::test]
    async fn test_render_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ChunkLayout::for_output(&dir.path().join("book.mp3"));
        let plan = planner().plan(STORY, &mut resolver());
        let backend = RecordingBackend::default();

        let progress = Mutex::new(Vec::new());
        let report = render(&backend, &plan, &layout, &RenderOptions::default(), |n| {
            progress.lock().unwrap().push(n)
        })
        .await
        .unwrap();

        assert_eq!(backend.calls.lock().unwrap().len(), plan.len());
        assert_eq!(*progress.lock().unwrap(), (1..=plan.len()).collect::<Vec<_>>());
        assert_eq!(report.files.len(), plan.len());
        for (chunk, file) in plan.iter().zip(&report.files) {
            assert_eq!(file, &layout.chunk_path(chunk.index));
            let audio = std::fs::read_to_string(file).unwrap();
            assert_eq!(audio, format!("{}|{}", chunk.voice, chunk.text));
        }
    }

    #[tokio::test]
    async fn test_rerender_uses_current_settings() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ChunkLayout::for_output(&dir.path().join("book.mp3"));
        let plan = planner().plan(r#"Intro. "Come in," Mary said."#, &mut resolver());

        let slow = RecordingBackend {
            prefix: "rate=1.0|",
            ..Default::default()
        };
        render(&slow, &plan, &layout, &RenderOptions::default(), |_| {})
            .await
            .unwrap();

        // same plan, different synthesis settings
        let fast = RecordingBackend {
            prefix: "rate=1.5|",
            ..Default::default()
        };
        let report = render(&fast, &plan, &layout, &RenderOptions::default(), |_| {})
            .await
            .unwrap();

        assert_eq!(fast.calls.lock().unwrap().len(), plan.len());
        let audio = std::fs::read_to_string(&report.files[0]).unwrap();
        assert_eq!(audio, "rate=1.5|narrator|Intro. ");
    }

    #[tokio::test]
    async fn test_partial_is_written_as_chunks_complete() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ChunkLayout::for_output(&dir.path().join("book.mp3"));
        let plan = planner().plan(r#"Intro. "Come in," Mary said."#, &mut resolver());
        let options = RenderOptions {
            concurrency: 1,
            ..Default::default()
        };

        // what an interrupted run would leave after the first chunk
        let partial_after_first = Mutex::new(None);
        render(&RecordingBackend::default(), &plan, &layout, &options, |n| {
            if n == 1 {
                *partial_after_first.lock().unwrap() = std::fs::read_to_string(&layout.partial).ok();
            }
        })
        .await
        .unwrap();

        assert_eq!(
            partial_after_first.into_inner().unwrap().as_deref(),
            Some("narrator|Intro. ")
        );
    }

    #[tokio::test]
    async fn test_failure_keeps_partial() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ChunkLayout::for_output(&dir.path().join("book.mp3"));
        let plan = planner().plan(r#"Intro. "Come in," Mary said."#, &mut resolver());
        let backend = RecordingBackend {
            fail_on: Some("Come in"),
            ..Default::default()
        };
        let options = RenderOptions {
            concurrency: 1,
            ..Default::default()
        };

        std::fs::write(&layout.partial, b"from an earlier run").unwrap();

        let err = render(&backend, &plan, &layout, &options, |_| {})
            .await
            .unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to synthesize chunk 2 (Mary, female-1)"));

        // only the first chunk completed, so the partial file is a copy of it
        let partial = std::fs::read_to_string(&layout.partial).unwrap();
        assert_eq!(partial, "narrator|Intro. ");
    }

    #[test]
    fn test_export_single_chunk_removes_partial() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ChunkLayout::for_output(&dir.path().join("book.mp3"));
        std::fs::create_dir_all(&layout.chunk_dir).unwrap();
        let chunk = layout.chunk_path(0);
        std::fs::write(&chunk, b"audio").unwrap();
        std::fs::write(&layout.partial, b"old").unwrap();

        let report = RenderReport { files: vec![chunk] };
        export(&report, &layout).unwrap();
        assert_eq!(std::fs::read(&layout.output).unwrap(), b"audio");
        assert!(!layout.partial.exists());
    }
}
