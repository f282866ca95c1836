//! Study topic command handlers

use anyhow::{bail, Result};

use super::helpers::open_database;

/// Trim a topic and reject it when nothing is left
///
/// # Errors
///
/// Returns an error if the topic is blank
pub fn validate_topic(topic: &str) -> Result<&str> {
    let topic = topic.trim();
    if topic.is_empty() {
        bail!("Please enter a study topic");
    }
    Ok(topic)
}

pub fn handle_topic_show() -> Result<()> {
    let db = open_database()?;
    match db.get_settings()?.active_topic() {
        Some(topic) => println!("Study topic: {topic}"),
        None => println!("No study topic saved, pages are analysed only if the extension supplies one"),
    }
    Ok(())
}

pub fn handle_topic_set(topic: &str) -> Result<()> {
    let topic = validate_topic(topic)?;
    let db = open_database()?;
    let mut settings = db.get_settings()?;
    settings.study_topic = Some(topic.to_string());
    db.save_settings(&settings)?;
    log::info!("Study topic set to {topic:?}");
    println!("Settings saved! Study topic: {topic}");
    Ok(())
}

pub fn handle_topic_clear() -> Result<()> {
    let db = open_database()?;
    let mut settings = db.get_settings()?;
    settings.study_topic = None;
    db.save_settings(&settings)?;
    println!("Study topic cleared, pages are analysed only if the extension supplies one");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_topic_trims() {
        assert_eq!(validate_topic("  organic chemistry ").unwrap(), "organic chemistry");
    }

    #[test]
    fn test_validate_topic_rejects_blank() {
        let err = validate_topic("   ").unwrap_err();
        assert_eq!(err.to_string(), "Please enter a study topic");
    }
}
