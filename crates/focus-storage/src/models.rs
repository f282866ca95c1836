use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Scores at or above this value mark a page as relevant to the study topic.
pub const RELEVANCE_THRESHOLD: f64 = 0.6;

pub const UNAVAILABLE_SUMMARY: &str = "Content analysis unavailable";
pub const UNAVAILABLE_EXPLANATION: &str = "Could not perform AI analysis";

/// Relevance verdict produced for one analysed page
///
/// `is_relevant` is never stored independently: it is derived from the score,
/// or forced to `true` for the fail-open verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawVerdict")]
pub struct RelevanceVerdict {
    relevance_score: f64,
    summary: String,
    explanation: String,
    fail_open: bool,
}

/// Verdict as found in serialized form, before normalisation
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawVerdict {
    relevance_score: f64,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    explanation: String,
    #[serde(default)]
    fail_open: bool,
}

impl From<RawVerdict> for RelevanceVerdict {
    fn from(raw: RawVerdict) -> Self {
        if raw.fail_open {
            Self::fail_open()
        } else {
            Self::from_score(raw.relevance_score, raw.summary, raw.explanation)
        }
    }
}

impl RelevanceVerdict {
    /// Build a verdict from a model-produced score.
    ///
    /// Scores outside `[0, 1]` are clamped; a NaN score is treated as 0.
    #[must_use]
    pub fn from_score(relevance_score: f64, summary: String, explanation: String) -> Self {
        let relevance_score = if relevance_score.is_nan() {
            0.0
        } else {
            relevance_score.clamp(0.0, 1.0)
        };
        Self {
            relevance_score,
            summary,
            explanation,
            fail_open: false,
        }
    }

    /// Neutral verdict used whenever analysis could not be performed.
    #[must_use]
    pub fn fail_open() -> Self {
        Self {
            relevance_score: 0.0,
            summary: UNAVAILABLE_SUMMARY.to_string(),
            explanation: UNAVAILABLE_EXPLANATION.to_string(),
            fail_open: true,
        }
    }

    #[must_use]
    pub fn relevance_score(&self) -> f64 {
        self.relevance_score
    }

    #[must_use]
    pub fn summary(&self) -> &str {
        &self.summary
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    #[must_use]
    pub fn is_fail_open(&self) -> bool {
        self.fail_open
    }

    #[must_use]
    pub fn is_relevant(&self) -> bool {
        self.fail_open || self.relevance_score >= RELEVANCE_THRESHOLD
    }
}

/// One analysed page, keyed by URL. Later analyses replace earlier ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzedPageRecord {
    pub url: String,
    pub timestamp: DateTime<Utc>,
    pub verdict: RelevanceVerdict,
}

impl AnalyzedPageRecord {
    #[must_use]
    pub fn new(url: String, verdict: RelevanceVerdict) -> Self {
        Self {
            url,
            timestamp: Utc::now(),
            verdict,
        }
    }

    #[must_use]
    pub fn is_relevant(&self) -> bool {
        self.verdict.is_relevant()
    }
}

/// Completed navigation as reported by the browser
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationEvent {
    pub url: String,
    pub tab_id: i64,
    pub frame_id: i64,
    pub timestamp: DateTime<Utc>,
}

impl NavigationEvent {
    #[must_use]
    pub fn is_main_frame(&self) -> bool {
        self.frame_id == 0
    }
}

/// Append-only navigation log entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationRecord {
    pub id: i64,
    pub url: String,
    pub timestamp: DateTime<Utc>,
    pub tab_id: i64,
}

/// User settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub study_topic: Option<String>,
}

impl Settings {
    /// Trimmed study topic, or `None` when unset or blank
    #[must_use]
    pub fn active_topic(&self) -> Option<&str> {
        self.study_topic
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

/// Language-model backend used for relevance analysis
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    /// Hosted Gemini endpoint
    #[default]
    Google,
    /// Local model served by Ollama
    Ollama,
    /// Any OpenAI-compatible chat completions endpoint
    OpenAi,
}

impl AiProvider {
    #[must_use]
    pub fn parse_provider(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "google" | "gemini" => Some(Self::Google),
            "ollama" | "local" => Some(Self::Ollama),
            "openai" => Some(Self::OpenAi),
            _ => None,
        }
    }

    #[must_use]
    pub fn default_model(self) -> &'static str {
        match self {
            Self::Google => "gemini-pro",
            Self::Ollama => "llama3.2",
            Self::OpenAi => "gpt-4o-mini",
        }
    }

    #[must_use]
    pub fn default_base_url(self) -> &'static str {
        match self {
            Self::Google => "https://generativelanguage.googleapis.com/v1beta",
            Self::Ollama => "http://localhost:11434",
            Self::OpenAi => "https://api.openai.com/v1",
        }
    }

    /// Environment variables consulted when no API key is stored
    #[must_use]
    pub fn api_key_env_vars(self) -> &'static [&'static str] {
        match self {
            Self::Google => &["GEMINI_API_KEY", "GOOGLE_API_KEY"],
            Self::Ollama => &[],
            Self::OpenAi => &["OPENAI_API_KEY"],
        }
    }
}

impl fmt::Display for AiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Google => "google",
            Self::Ollama => "ollama",
            Self::OpenAi => "openai",
        };
        f.write_str(name)
    }
}

pub const DEFAULT_AI_TIMEOUT_SECS: u64 = 30;

/// AI backend configuration (single row)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiConfig {
    pub provider: AiProvider,
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub enabled: bool,
    pub timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: AiProvider::default(),
            model: None,
            api_key: None,
            base_url: None,
            enabled: true,
            timeout_secs: DEFAULT_AI_TIMEOUT_SECS,
        }
    }
}

impl AiConfig {
    #[must_use]
    pub fn effective_model(&self) -> &str {
        self.model
            .as_deref()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| self.provider.default_model())
    }

    #[must_use]
    pub fn effective_base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| self.provider.default_base_url())
    }

    /// Stored key first, then the provider's environment variables
    #[must_use]
    pub fn effective_api_key(&self) -> Option<String> {
        if let Some(key) = self.api_key.as_deref().filter(|k| !k.is_empty()) {
            return Some(key.to_string());
        }
        self.provider
            .api_key_env_vars()
            .iter()
            .find_map(|var| std::env::var(var).ok().filter(|v| !v.is_empty()))
    }
}
