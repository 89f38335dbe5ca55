//! voice-cast configuration: TOML file with environment overrides.

use crate::error::ConfigError;
use crate::text::chunker::DEFAULT_MAX_CHARS;
use crate::text::{Segmenter, SegmenterOptions};
use crate::voice::{NameDictionary, VoicePool};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_SPEAKING_RATE: f32 = 1.0;
const DEFAULT_PITCH: f32 = 0.0;
const DEFAULT_CONCURRENCY: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceCastConfig {
    /// Voices handed to male speakers, in order
    #[serde(default)]
    pub male_voices: Vec<String>,

    /// Voices handed to female speakers, in order
    #[serde(default)]
    pub female_voices: Vec<String>,

    /// Narrator and fallback voice
    #[serde(default)]
    pub default_voice: Option<String>,

    /// Speaking rate (0.25-4.0)
    #[serde(default = "default_speaking_rate")]
    pub speaking_rate: f32,

    /// Pitch in semitones (-20.0-20.0)
    #[serde(default = "default_pitch")]
    pub pitch: f32,

    /// Maximum characters per synthesis request
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,

    /// Synthesis requests in flight at once
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Voice `Mary said` cues with the narrator instead of dropping them
    #[serde(default)]
    pub narrate_attributions: bool,

    /// Google Cloud API key
    #[serde(default)]
    pub api_key: Option<String>,

    /// OAuth access token; only ever read from the environment
    #[serde(skip)]
    pub access_token: Option<String>,

    #[serde(default)]
    pub segmenter: SegmenterOptions,

    /// Extra first names for gender inference
    #[serde(default)]
    pub names: NameLists,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameLists {
    #[serde(default)]
    pub male: Vec<String>,
    #[serde(default)]
    pub female: Vec<String>,
}

fn default_speaking_rate() -> f32 {
    DEFAULT_SPEAKING_RATE
}

fn default_pitch() -> f32 {
    DEFAULT_PITCH
}

fn default_max_chars() -> usize {
    DEFAULT_MAX_CHARS
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

impl Default for VoiceCastConfig {
    fn default() -> Self {
        Self {
            male_voices: Vec::new(),
            female_voices: Vec::new(),
            default_voice: None,
            speaking_rate: default_speaking_rate(),
            pitch: default_pitch(),
            max_chars: default_max_chars(),
            concurrency: default_concurrency(),
            narrate_attributions: false,
            api_key: None,
            access_token: None,
            segmenter: SegmenterOptions::default(),
            names: NameLists::default(),
        }
    }
}

/// Split a comma separated voice list, dropping blank entries.
fn parse_voice_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_env<T: std::str::FromStr>(var: &str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidEnv {
            var: var.to_string(),
            value,
        })
}

impl VoiceCastConfig {
    /// Get the config file path: ~/.config/cli-programs/voice-cast.toml
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .map_err(|_| ConfigError::NoHomeDir)?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("cli-programs")
            .join("voice-cast.toml"))
    }

    /// Load the config file (or defaults) and apply `.env` and environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                log::warn!("Failed to read .env file: {}", e);
            }
        }

        let mut config = Self::load_file()?;
        config.apply_env(|var| std::env::var(var).ok())?;
        Ok(config)
    }

    /// Load the config file only, returning defaults if it doesn't exist.
    pub fn load_file() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: VoiceCastConfig = toml::from_str(&content)?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Save config to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Override fields from `GCP_*` variables supplied by `lookup`.
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(raw) = lookup("GCP_MALE_VOICES") {
            self.male_voices = parse_voice_list(&raw);
        }
        if let Some(raw) = lookup("GCP_FEMALE_VOICES") {
            self.female_voices = parse_voice_list(&raw);
        }
        if let Some(voice) = lookup("GCP_DEFAULT_VOICE").filter(|v| !v.trim().is_empty()) {
            self.default_voice = Some(voice.trim().to_string());
        }
        if let Some(raw) = lookup("GCP_SPEAKING_RATE") {
            self.set_speaking_rate(parse_env("GCP_SPEAKING_RATE", raw)?);
        }
        if let Some(raw) = lookup("GCP_PITCH") {
            self.set_pitch(parse_env("GCP_PITCH", raw)?);
        }
        if let Some(key) = lookup("GCP_API_KEY").filter(|v| !v.is_empty()) {
            self.api_key = Some(key);
        }
        if let Some(token) = lookup("GCP_ACCESS_TOKEN").filter(|v| !v.is_empty()) {
            self.access_token = Some(token);
        }
        Ok(())
    }

    pub fn set_speaking_rate(&mut self, rate: f32) {
        self.speaking_rate = rate.clamp(0.25, 4.0);
    }

    pub fn set_pitch(&mut self, pitch: f32) {
        self.pitch = pitch.clamp(-20.0, 20.0);
    }

    pub fn set_max_chars(&mut self, max_chars: usize) {
        self.max_chars = max_chars.max(1);
    }

    pub fn voice_pool(&self) -> Result<VoicePool, ConfigError> {
        VoicePool::new(
            self.male_voices.clone(),
            self.female_voices.clone(),
            self.default_voice.clone(),
        )
    }

    pub fn name_dictionary(&self) -> NameDictionary {
        NameDictionary::builtin().with_names(&self.names.male, &self.names.female)
    }

    pub fn segmenter(&self) -> Result<Segmenter, ConfigError> {
        Segmenter::new(self.segmenter.clone())
    }
}
