//! Relevance classification of page content against the study topic.
//!
//! Every failure path produces the fail-open verdict, so an outage of the
//! language model never closes a tab.

use focus_storage::models::{AiConfig, RelevanceVerdict};
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;
use std::time::Duration;
use thiserror::Error;

use crate::ai_provider::{create_provider, AiProviderTrait};
use crate::page::{truncate_chars, PageContent};

/// Characters of the page text blob embedded in the prompt
pub const PROMPT_EXCERPT_CAP: usize = 1000;

/// Why a classification fell back to the fail-open verdict
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("AI analysis is disabled")]
    Disabled,

    #[error("AI backend unavailable: {0}")]
    Unavailable(String),

    #[error("AI backend did not answer within {0:?}")]
    Timeout(Duration),

    #[error("AI backend error: {0:#}")]
    Backend(anyhow::Error),

    #[error("Malformed model response: {0}")]
    MalformedResponse(String),
}

enum Backend {
    Ready(Box<dyn AiProviderTrait>),
    Disabled,
    Unavailable(String),
}

/// Asks a language model whether a page matches the study topic
pub struct RelevanceClassifier {
    backend: Backend,
    timeout: Duration,
}

impl RelevanceClassifier {
    #[must_use]
    pub fn new(provider: Box<dyn AiProviderTrait>, timeout: Duration) -> Self {
        Self {
            backend: Backend::Ready(provider),
            timeout,
        }
    }

    /// Build a classifier from stored configuration
    ///
    /// Never fails: a disabled or misconfigured backend yields a classifier
    /// that always answers with the fail-open verdict.
    #[must_use]
    pub fn from_config(config: &AiConfig) -> Self {
        let timeout = Duration::from_secs(config.timeout_secs.max(1));
        let backend = if !config.enabled {
            Backend::Disabled
        } else {
            match create_provider(config) {
                Ok(provider) => {
                    log::info!(
                        "Relevance classifier using {} ({})",
                        config.provider,
                        provider.model_name()
                    );
                    Backend::Ready(provider)
                }
                Err(e) => {
                    log::warn!("AI provider not configured, analysis will fail open: {e:#}");
                    Backend::Unavailable(format!("{e:#}"))
                }
            }
        };
        Self { backend, timeout }
    }

    /// Model name, if a backend is configured
    #[must_use]
    pub fn model_name(&self) -> Option<&str> {
        match &self.backend {
            Backend::Ready(provider) => Some(provider.model_name()),
            Backend::Disabled | Backend::Unavailable(_) => None,
        }
    }

    /// Check whether the backend is configured and reachable
    pub async fn is_available(&self) -> bool {
        match &self.backend {
            Backend::Ready(provider) => provider.is_available().await,
            Backend::Disabled | Backend::Unavailable(_) => false,
        }
    }

    /// Classify a page, falling back to the fail-open verdict on any failure
    pub async fn classify(&self, page: &PageContent) -> RelevanceVerdict {
        match self.try_classify(page).await {
            Ok(verdict) => {
                log::debug!(
                    "Classified {} as {:.2} (relevant: {})",
                    page.url(),
                    verdict.relevance_score(),
                    verdict.is_relevant()
                );
                verdict
            }
            Err(e) => {
                log::warn!("Analysis of {} failed, allowing page: {e}", page.url());
                RelevanceVerdict::fail_open()
            }
        }
    }

    /// Classify a page, reporting why analysis failed
    ///
    /// # Errors
    ///
    /// Returns a [`ClassifierError`] when the backend is disabled, missing,
    /// slow, failing, or answers with something that is not a verdict.
    pub async fn try_classify(&self, page: &PageContent) -> Result<RelevanceVerdict, ClassifierError> {
        let provider = match &self.backend {
            Backend::Ready(provider) => provider,
            Backend::Disabled => return Err(ClassifierError::Disabled),
            Backend::Unavailable(reason) => {
                return Err(ClassifierError::Unavailable(reason.clone()))
            }
        };

        let prompt = build_prompt(page);
        let response = tokio::time::timeout(self.timeout, provider.generate(&prompt))
            .await
            .map_err(|_| ClassifierError::Timeout(self.timeout))?
            .map_err(ClassifierError::Backend)?;

        parse_verdict(&response)
    }
}

/// Build the instruction sent to the model
#[must_use]
pub fn build_prompt(page: &PageContent) -> String {
    let blob = page.text_blob();
    let excerpt = truncate_chars(&blob, PROMPT_EXCERPT_CAP);

    format!(
        "Analyze this webpage content and determine if it's relevant to the study topic \"{}\".\n\
         Return the response in the following JSON format:\n\
         {{\n  \"relevanceScore\": (number between 0 and 1),\n  \
         \"summary\": \"brief summary of the content\",\n  \
         \"explanation\": \"explanation of relevance score\"\n}}\n\
         Return only the JSON object.\n\
         \n\
         Webpage content: {}",
        page.study_topic(),
        excerpt
    )
}

fn code_fence() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| {
        Regex::new(r"(?s)^\s*```[A-Za-z0-9_-]*\s*(.*?)\s*```\s*$").unwrap_or_else(|_| unreachable!())
    })
}

/// Remove a surrounding markdown code fence, if any
#[must_use]
pub fn strip_code_fence(raw: &str) -> &str {
    code_fence()
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map_or_else(|| raw.trim(), |m| m.as_str())
}

/// Locate the JSON object in a model reply
fn extract_json(raw: &str) -> Option<&str> {
    let clean = strip_code_fence(raw);
    if clean.starts_with('{') && clean.ends_with('}') {
        return Some(clean);
    }
    let start = clean.find('{')?;
    let end = clean.rfind('}')?;
    (start < end).then(|| &clean[start..=end])
}

fn score_of(value: &Value) -> Option<f64> {
    let score = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    score.is_finite().then_some(score)
}

fn text_of(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Parse a model reply into a verdict
///
/// Accepts the flat shape `{relevanceScore, summary, explanation}` and the
/// nested shape where summary and explanation sit under `detailedSummary`
/// (as an object or a plain string).
///
/// # Errors
///
/// Returns [`ClassifierError::MalformedResponse`] when no JSON object or no
/// finite numeric score is present.
pub fn parse_verdict(raw: &str) -> Result<RelevanceVerdict, ClassifierError> {
    let json_text = extract_json(raw)
        .ok_or_else(|| ClassifierError::MalformedResponse("no JSON object in reply".to_string()))?;

    let value: Value = serde_json::from_str(json_text)
        .map_err(|e| ClassifierError::MalformedResponse(e.to_string()))?;

    let score = score_of(&value["relevanceScore"])
        .or_else(|| score_of(&value["relevance_score"]))
        .ok_or_else(|| {
            ClassifierError::MalformedResponse("missing numeric relevanceScore".to_string())
        })?;

    let detailed = &value["detailedSummary"];
    let summary = text_of(&value["summary"])
        .or_else(|| text_of(detailed))
        .or_else(|| text_of(&detailed["summary"]))
        .unwrap_or_default();
    let explanation = text_of(&value["explanation"])
        .or_else(|| text_of(&detailed["explanation"]))
        .or_else(|| text_of(&value["reason"]))
        .unwrap_or_default();

    Ok(RelevanceVerdict::from_score(score, summary, explanation))
}
