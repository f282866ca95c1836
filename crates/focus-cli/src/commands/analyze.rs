//! One-off analysis of a page outside the browser

use anyhow::{Context, Result};
use focus_ai::{PageContent, RelevanceClassifier};
use focus_core::extractor::{extract_page_content, fetch_html};
use focus_core::Recorder;
use focus_storage::{RelevanceVerdict, RELEVANCE_THRESHOLD};
use std::path::Path;
use std::sync::Arc;

use super::helpers::open_database;
use super::topic::validate_topic;

/// Classify a page against the study topic and store the verdict
///
/// # Errors
///
/// Returns an error if no topic is available, the page cannot be read, or the verdict cannot be stored
pub async fn analyze_command(
    url: &str,
    topic: Option<&str>,
    file: Option<&Path>,
    json: bool,
) -> Result<()> {
    let db = Arc::new(open_database()?);

    let topic = match topic {
        Some(t) => validate_topic(t)?.to_string(),
        None => db
            .get_settings()?
            .active_topic()
            .map(str::to_string)
            .context("Please enter a study topic (focus topic set \"<topic>\")")?,
    };

    let html = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => fetch_html(url).await?,
    };
    let page = extract_page_content(&html, url, &topic);

    let classifier = RelevanceClassifier::from_config(&db.get_ai_config()?);
    let verdict = classifier.classify(&page).await;
    Recorder::new(db).record_analysis(page.url(), &verdict)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&verdict)?);
    } else {
        print_verdict(&page, &verdict);
    }
    Ok(())
}

fn print_verdict(page: &PageContent, verdict: &RelevanceVerdict) {
    println!("Page:    {}", page.url());
    if !page.title().is_empty() {
        println!("Title:   {}", page.title());
    }
    println!("Topic:   {}", page.study_topic());

    if verdict.is_fail_open() {
        println!("\nAnalysis unavailable, the page is allowed");
        println!("Reason:  {}", verdict.explanation());
        return;
    }

    println!(
        "\nScore:   {:.2} (threshold {RELEVANCE_THRESHOLD:.1})",
        verdict.relevance_score()
    );
    println!("Summary: {}", verdict.summary());
    println!("Reason:  {}", verdict.explanation());
    if verdict.is_relevant() {
        println!("\nRelevant: the tab would stay open");
    } else {
        println!("\nIrrelevant: the tab would be closed");
    }
}
