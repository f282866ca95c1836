use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use crate::ai_provider::AiProviderTrait;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Hosted Gemini provider
pub struct GoogleGenAiProvider {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GoogleGenAiProvider {
    #[must_use]
    pub fn new(api_key: &str, model: &str, base_url: Option<&str>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: base_url
                .unwrap_or(DEFAULT_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
        }
    }
}

#[async_trait]
impl AiProviderTrait for GoogleGenAiProvider {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);

        let body = json!({
            "contents": [{
                "parts": [{ "text": prompt }]
            }],
            "generationConfig": {
                "temperature": 0.7,
                "topK": 40,
                "topP": 0.95
            }
        });

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .context("Failed to send request to Google AI")?;

        if !response.status().is_success() {
            anyhow::bail!("Google AI API error {}", super::error_text(response).await);
        }

        let json: serde_json::Value = response
            .json()
            .await
            .context("Failed to parse Google AI response")?;

        // candidates[0].content.parts[0].text
        json["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .map(ToString::to_string)
            .context("Failed to extract text from Google AI response")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{matchers, Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_generate_extracts_candidate_text() {
        let mock_server = MockServer::start().await;

        let response_body = json!({
            "candidates": [{
                "content": { "parts": [{ "text": "{\"relevanceScore\": 0.9}" }] }
            }]
        });

        Mock::given(matchers::method("POST"))
            .and(matchers::path("/models/gemini-pro:generateContent"))
            .and(matchers::header("x-goog-api-key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(response_body))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = GoogleGenAiProvider::new("test-key", "gemini-pro", Some(&mock_server.uri()));
        let text = provider.generate("prompt").await.unwrap();
        assert_eq!(text, "{\"relevanceScore\": 0.9}");
    }

    #[tokio::test]
    async fn test_generate_http_error() {
        let mock_server = MockServer::start().await;

        Mock::given(matchers::method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = GoogleGenAiProvider::new("bad-key", "gemini-pro", Some(&mock_server.uri()));
        let err = provider.generate("prompt").await.unwrap_err();
        assert!(err.to_string().contains("API key not valid"));
    }

    #[tokio::test]
    async fn test_generate_missing_candidates() {
        let mock_server = MockServer::start().await;

        Mock::given(matchers::method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
            .mount(&mock_server)
            .await;

        let provider = GoogleGenAiProvider::new("key", "gemini-pro", Some(&mock_server.uri()));
        assert!(provider.generate("prompt").await.is_err());
    }
}
