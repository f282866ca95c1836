use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Maximum number of characters of body text kept per page
pub const MAIN_CONTENT_CAP: usize = 5000;

/// Truncate to at most `max_chars` characters (not bytes).
#[must_use]
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Unnormalized page fields as they arrive from the content script
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawPageContent {
    pub title: String,
    pub url: String,
    pub headings: String,
    pub meta_description: String,
    pub main_content: String,
    pub study_topic: String,
}

/// Normalized content of one page load, ready for relevance analysis
///
/// `main_content` is always within [`MAIN_CONTENT_CAP`] characters. The value
/// cannot be modified after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawPageContent")]
pub struct PageContent {
    title: String,
    url: String,
    headings: String,
    meta_description: String,
    main_content: String,
    study_topic: String,
}

impl From<RawPageContent> for PageContent {
    fn from(raw: RawPageContent) -> Self {
        let main_content = truncate_chars(&raw.main_content, MAIN_CONTENT_CAP).to_string();
        Self {
            title: raw.title.trim().to_string(),
            url: raw.url,
            headings: raw.headings,
            meta_description: raw.meta_description,
            main_content,
            study_topic: raw.study_topic.trim().to_string(),
        }
    }
}

impl PageContent {
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub fn headings(&self) -> &str {
        &self.headings
    }

    #[must_use]
    pub fn meta_description(&self) -> &str {
        &self.meta_description
    }

    #[must_use]
    pub fn main_content(&self) -> &str {
        &self.main_content
    }

    #[must_use]
    pub fn study_topic(&self) -> &str {
        &self.study_topic
    }

    /// Copy of this page judged against a different topic
    #[must_use]
    pub fn with_study_topic(mut self, topic: &str) -> Self {
        topic.trim().clone_into(&mut self.study_topic);
        self
    }

    /// Render the normalized text blob sent to the language model
    #[must_use]
    pub fn text_blob(&self) -> String {
        let mut text = String::new();
        let _ = writeln!(text, "Title: {}", self.title);
        let _ = writeln!(text, "URL: {}", self.url);
        let _ = writeln!(text, "Headings: {}", self.headings);
        let _ = writeln!(text, "Description: {}", self.meta_description);
        let _ = write!(text, "Main Content: {}", self.main_content);
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_with_body(body: String) -> RawPageContent {
        RawPageContent {
            title: "Alkenes".to_string(),
            url: "https://chem.example/alkenes".to_string(),
            main_content: body,
            study_topic: "organic chemistry".to_string(),
            ..RawPageContent::default()
        }
    }

    #[test]
    fn test_truncate_chars_multibyte() {
        assert_eq!(truncate_chars("h\u{e9}llo", 2), "h\u{e9}");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[test]
    fn test_main_content_truncated_to_exact_cap() {
        let page = PageContent::from(raw_with_body("x".repeat(MAIN_CONTENT_CAP + 250)));
        assert_eq!(page.main_content().chars().count(), MAIN_CONTENT_CAP);
    }

    #[test]
    fn test_short_main_content_untouched() {
        let page = PageContent::from(raw_with_body("benzene ring".to_string()));
        assert_eq!(page.main_content(), "benzene ring");
    }

    #[test]
    fn test_deserialize_truncates_and_fills_missing_fields() {
        let json = serde_json::json!({
            "title": "Alkenes",
            "url": "https://chem.example",
            "mainContent": "\u{e9}".repeat(MAIN_CONTENT_CAP + 1),
            "studyTopic": "organic chemistry",
        });
        let page: PageContent = serde_json::from_value(json).unwrap();
        assert_eq!(page.main_content().chars().count(), MAIN_CONTENT_CAP);
        assert_eq!(page.headings(), "");
        assert_eq!(page.meta_description(), "");
    }

    #[test]
    fn test_text_blob_layout() {
        let page = PageContent::from(RawPageContent {
            title: "Alkenes".to_string(),
            url: "https://chem.example".to_string(),
            headings: "Addition Reactions".to_string(),
            meta_description: "Intro to alkenes".to_string(),
            main_content: "Double bonds".to_string(),
            study_topic: "organic chemistry".to_string(),
        });
        let blob = page.text_blob();
        assert!(blob.starts_with("Title: Alkenes\n"));
        assert!(blob.contains("Headings: Addition Reactions\n"));
        assert!(blob.contains("Description: Intro to alkenes\n"));
        assert!(blob.ends_with("Main Content: Double bonds"));
    }

    #[test]
    fn test_with_study_topic() {
        let page = PageContent::from(raw_with_body(String::new())).with_study_topic("  biology ");
        assert_eq!(page.study_topic(), "biology");
    }
}
