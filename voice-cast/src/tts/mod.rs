//! TTS backend trait and types.

pub mod google;

use crate::config::VoiceCastConfig;
use crate::error::{TtsError, TtsResult};
use async_trait::async_trait;
use std::time::Duration;

/// Base delay between retries; doubled on each attempt.
const RETRY_BASE_DELAY: Duration = Duration::from_millis(500);

/// Voice-independent synthesis settings.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisOptions {
    /// Speaking rate (0.25-4.0, default 1.0)
    pub speaking_rate: f32,
    /// Pitch in semitones (-20.0-20.0, default 0.0)
    pub pitch: f32,
}

impl Default for SynthesisOptions {
    fn default() -> Self {
        Self {
            speaking_rate: 1.0,
            pitch: 0.0,
        }
    }
}

impl SynthesisOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &VoiceCastConfig) -> Self {
        Self::new()
            .with_speaking_rate(config.speaking_rate)
            .with_pitch(config.pitch)
    }

    pub fn with_speaking_rate(mut self, rate: f32) -> Self {
        self.speaking_rate = rate.clamp(0.25, 4.0);
        self
    }

    pub fn with_pitch(mut self, pitch: f32) -> Self {
        self.pitch = pitch.clamp(-20.0, 20.0);
        self
    }
}

/// TTS backend trait - all synthesis engines implement this.
#[async_trait]
pub trait TtsBackend: Send + Sync {
    /// Synthesize text with the given voice, returning encoded MP3 bytes.
    async fn synthesize(&self, text: &str, voice: &str) -> TtsResult<Vec<u8>>;

    /// Backend name for display.
    fn name(&self) -> &'static str;

    /// Synthesize, retrying transient failures with exponential backoff.
    async fn synthesize_with_retry(
        &self,
        text: &str,
        voice: &str,
        max_attempts: u32,
    ) -> TtsResult<Vec<u8>> {
        let max_attempts = max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            match self.synthesize(text, voice).await {
                Ok(audio) => return Ok(audio),
                Err(e) if attempt < max_attempts && e.is_retryable() => {
                    let delay = match &e {
                        TtsError::RateLimited {
                            retry_after: Some(secs),
                        } => Duration::from_secs(*secs),
                        _ => RETRY_BASE_DELAY * 2u32.pow(attempt - 1),
                    };
                    log::warn!(
                        "{} synthesis failed (attempt {}/{}): {}. Retrying in {:?}",
                        self.name(),
                        attempt,
                        max_attempts,
                        e,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FlakyBackend {
        failures: usize,
        calls: AtomicUsize,
        retryable: bool,
    }

    #[async_trait]
    impl TtsBackend for FlakyBackend {
        async fn synthesize(&self, text: &str, _voice: &str) -> TtsResult<Vec<u8>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                let status_code = if self.retryable { Some(503) } else { Some(400) };
                return Err(TtsError::ApiError {
                    message: "unavailable".to_string(),
                    status_code,
                });
            }
            Ok(text.as_bytes().to_vec())
        }

        fn name(&self) -> &'static str {
            "flaky"
        }
    }

    #[test]
    fn test_synthesis_options_default() {
        let opts = SynthesisOptions::default();
        assert_eq!(opts.speaking_rate, 1.0);
        assert_eq!(opts.pitch, 0.0);
    }

    #[test]
    fn test_synthesis_options_clamping() {
        let opts = SynthesisOptions::new()
            .with_speaking_rate(10.0)
            .with_pitch(-50.0);
        assert_eq!(opts.speaking_rate, 4.0);
        assert_eq!(opts.pitch, -20.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_recovers_from_transient_errors() {
        let backend = FlakyBackend {
            failures: 2,
            calls: AtomicUsize::new(0),
            retryable: true,
        };
        let audio = backend.synthesize_with_retry("hi", "v", 3).await.unwrap();
        assert_eq!(audio, b"hi");
        assert_eq!(backend.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_gives_up_after_max_attempts() {
        let backend = FlakyBackend {
            failures: 10,
            calls: AtomicUsize::new(0),
            retryable: true,
        };
        assert!(backend.synthesize_with_retry("hi", "v", 3).await.is_err());
        assert_eq!(backend.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_no_retry_on_client_errors() {
        let backend = FlakyBackend {
            failures: 1,
            calls: AtomicUsize::new(0),
            retryable: false,
        };
        assert!(backend.synthesize_with_retry("hi", "v", 3).await.is_err());
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }
}
