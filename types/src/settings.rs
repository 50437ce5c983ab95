//! Resolved configuration types shared across crates.
//!
//! Raw TOML deserialization structs (with `Option` fields) stay private in
//! `venire-config`. The config loader resolves them into these types at the
//! parse boundary, so holding one of these values means it is valid.

use std::time::Duration;

use thiserror::Error;

use crate::Party;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("peremptory allowance for {0} must be at least 1")]
    ZeroPeremptory(&'static str),
    #[error("jury size must be at least 1")]
    ZeroJurySize,
}

/// Per-party peremptory challenge allowance. Both values are positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrikeAllowance {
    plaintiff: u32,
    defense: u32,
}

impl StrikeAllowance {
    pub const DEFAULT_PEREMPTORY: u32 = 6;

    pub fn new(plaintiff: u32, defense: u32) -> Result<Self, SettingsError> {
        if plaintiff == 0 {
            return Err(SettingsError::ZeroPeremptory(Party::Plaintiff.as_str()));
        }
        if defense == 0 {
            return Err(SettingsError::ZeroPeremptory(Party::Defense.as_str()));
        }
        Ok(Self { plaintiff, defense })
    }

    #[must_use]
    pub const fn max_for(self, party: Party) -> u32 {
        match party {
            Party::Plaintiff => self.plaintiff,
            Party::Defense => self.defense,
        }
    }
}

impl Default for StrikeAllowance {
    fn default() -> Self {
        Self {
            plaintiff: Self::DEFAULT_PEREMPTORY,
            defense: Self::DEFAULT_PEREMPTORY,
        }
    }
}

/// How many jurors and alternates can be empanelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SeatingLimits {
    jury_size: u32,
    alternates: u32,
}

impl SeatingLimits {
    pub fn new(jury_size: u32, alternates: u32) -> Result<Self, SettingsError> {
        if jury_size == 0 {
            return Err(SettingsError::ZeroJurySize);
        }
        Ok(Self {
            jury_size,
            alternates,
        })
    }

    #[must_use]
    pub const fn jury_size(self) -> u32 {
        self.jury_size
    }

    #[must_use]
    pub const fn alternates(self) -> u32 {
        self.alternates
    }
}

impl Default for SeatingLimits {
    fn default() -> Self {
        Self {
            jury_size: 12,
            alternates: 2,
        }
    }
}

/// Completion-API key.
///
/// `Debug` is manually implemented to redact the key value, preventing
/// accidental credential disclosure in logs or error messages.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Returns `None` for an empty or whitespace-only key.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    #[must_use]
    pub fn expose_secret(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ApiKey(<redacted>)")
    }
}

/// Settings for the question-suggestion collaborator.
#[derive(Debug, Clone)]
pub struct SuggestSettings {
    /// `None` means every request falls back to the built-in questions.
    pub api_key: Option<ApiKey>,
    pub model: String,
    /// Base URL of an OpenAI-compatible API, without the trailing path.
    pub base_url: String,
    pub debounce: Duration,
    pub timeout: Duration,
}

impl SuggestSettings {
    pub const DEFAULT_MODEL: &'static str = "gpt-4o-mini";
    pub const DEFAULT_BASE_URL: &'static str = "https://api.openai.com/v1";
    pub const DEFAULT_DEBOUNCE_MS: u64 = 600;
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
}

impl Default for SuggestSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: Self::DEFAULT_MODEL.to_string(),
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            debounce: Duration::from_millis(Self::DEFAULT_DEBOUNCE_MS),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
        }
    }
}
