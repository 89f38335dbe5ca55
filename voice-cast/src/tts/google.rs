//! Google Cloud Text-to-Speech backend.
//!
//! Direct HTTP implementation of the `v1/text:synthesize` REST method.

use super::{SynthesisOptions, TtsBackend};
use crate::config::VoiceCastConfig;
use crate::error::{TtsError, TtsResult};
use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use reqwest::Client;
use reqwest::header::RETRY_AFTER;
use serde::{Deserialize, Serialize};

const GOOGLE_TTS_URL: &str = "https://texttospeech.googleapis.com/v1/text:synthesize";

/// How requests are authenticated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GoogleAuth {
    /// `?key=` query parameter
    ApiKey(String),
    /// `Authorization: Bearer` header, e.g. from `gcloud auth print-access-token`
    AccessToken(String),
}

impl GoogleAuth {
    /// Prefer an access token over an API key when both are configured.
    pub fn from_config(config: &VoiceCastConfig) -> TtsResult<Self> {
        if let Some(token) = &config.access_token {
            return Ok(Self::AccessToken(token.clone()));
        }
        config
            .api_key
            .clone()
            .map(Self::ApiKey)
            .ok_or(TtsError::MissingCredentials)
    }
}

pub struct GoogleTtsBackend {
    client: Client,
    auth: GoogleAuth,
    options: SynthesisOptions,
    endpoint: String,
}

impl GoogleTtsBackend {
    pub fn new(auth: GoogleAuth, options: SynthesisOptions) -> Self {
        Self {
            client: Client::new(),
            auth,
            options,
            endpoint: GOOGLE_TTS_URL.to_string(),
        }
    }

    pub fn from_config(config: &VoiceCastConfig) -> TtsResult<Self> {
        Ok(Self::new(
            GoogleAuth::from_config(config)?,
            SynthesisOptions::from_config(config),
        ))
    }

    fn build_request<'a>(&self, text: &'a str, voice: &'a str) -> SynthesizeRequest<'a> {
        SynthesizeRequest {
            input: SynthesisInput { text },
            voice: VoiceSelection {
                language_code: language_code(voice),
                name: voice,
            },
            audio_config: AudioConfig {
                audio_encoding: "MP3",
                speaking_rate: self.options.speaking_rate,
                pitch: self.options.pitch,
            },
        }
    }
}

/// Derive a language code from a voice name: `en-US-Wavenet-D` -> `en-us`.
pub fn language_code(voice: &str) -> String {
    let parts: Vec<&str> = voice.split('-').collect();
    if parts.len() >= 2 {
        format!("{}-{}", parts[0].to_lowercase(), parts[1].to_lowercase())
    } else {
        parts[0].to_lowercase()
    }
}

// Google TTS request/response types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeRequest<'a> {
    input: SynthesisInput<'a>,
    voice: VoiceSelection<'a>,
    audio_config: AudioConfig,
}

#[derive(Debug, Serialize)]
struct SynthesisInput<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceSelection<'a> {
    language_code: String,
    name: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioConfig {
    audio_encoding: &'static str,
    speaking_rate: f32,
    pitch: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    audio_content: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

fn decode_audio(response: SynthesizeResponse) -> TtsResult<Vec<u8>> {
    let audio = STANDARD
        .decode(response.audio_content.as_bytes())
        .map_err(|e| TtsError::InvalidAudio(e.to_string()))?;

    if audio.is_empty() {
        return Err(TtsError::InvalidAudio("empty audio content".to_string()));
    }
    Ok(audio)
}

#[async_trait]
impl TtsBackend for GoogleTtsBackend {
    async fn synthesize(&self, text: &str, voice: &str) -> TtsResult<Vec<u8>> {
        let request = self.build_request(text, voice);

        let builder = self.client.post(&self.endpoint).json(&request);
        let builder = match &self.auth {
            GoogleAuth::ApiKey(key) => builder.query(&[("key", key)]),
            GoogleAuth::AccessToken(token) => builder.bearer_auth(token),
        };

        let response = builder.send().await?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok());
            let error_text = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                return Err(TtsError::RateLimited { retry_after });
            }

            let message =
                if let Ok(error_response) = serde_json::from_str::<ErrorResponse>(&error_text) {
                    error_response.error.message
                } else {
                    error_text
                };

            return Err(TtsError::ApiError {
                message,
                status_code: Some(status.as_u16()),
            });
        }

        let api_response: SynthesizeResponse =
            response.json().await.map_err(|e| TtsError::ApiError {
                message: format!("Failed to parse response: {}", e),
                status_code: None,
            })?;

        decode_audio(api_response)
    }

    fn name(&self) -> &'static str {
        "Google TTS"
    }
}
