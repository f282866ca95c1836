pub mod google;
pub mod ollama;
pub mod openai;

/// Read an error body for logging without failing the caller
async fn error_text(response: reqwest::Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    format!("{status}: {body}")
}
