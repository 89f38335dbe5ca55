use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "No default voice configured. Set GCP_DEFAULT_VOICE or configure at least one male or female voice."
    )]
    NoDefaultVoice,

    #[error("At least one quote style must be configured")]
    NoQuoteStyles,

    #[error("Invalid quote pattern: {0}")]
    QuotePattern(#[from] regex::Error),

    #[error("Invalid value for {var}: {value:?}")]
    InvalidEnv { var: String, value: String },

    #[error("Could not determine home directory")]
    NoHomeDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

#[derive(Error, Debug)]
pub enum TtsError {
    #[error("No credentials for Google Text-to-Speech. Set GCP_API_KEY or GCP_ACCESS_TOKEN.")]
    MissingCredentials,

    #[error("Rate limit exceeded{}", .retry_after.map(|s| format!(". Retry after {} seconds", s)).unwrap_or_default())]
    RateLimited { retry_after: Option<u64> },

    #[error("API error{}: {message}", status_code.map(|c| format!(" (HTTP {})", c)).unwrap_or_default())]
    ApiError {
        message: String,
        status_code: Option<u16>,
    },

    #[error("Invalid audio in response: {0}")]
    InvalidAudio(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl TtsError {
    /// Whether another attempt could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            TtsError::RateLimited { .. } | TtsError::Http(_) => true,
            TtsError::ApiError { status_code, .. } => {
                status_code.is_none_or(|code| code >= 500)
            }
            TtsError::MissingCredentials | TtsError::InvalidAudio(_) => false,
        }
    }
}

pub type TtsResult<T> = std::result::Result<T, TtsError>;
