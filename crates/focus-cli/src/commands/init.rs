//! First-time setup: create the database and optionally set a topic

use anyhow::Result;

use super::helpers::open_database;
use super::topic::validate_topic;
use focus_core::config::{db_path, host_log_path};

/// Initialize focus
///
/// # Errors
///
/// Returns an error if the database cannot be created or the topic is empty
pub fn init_command(topic: Option<&str>) -> Result<()> {
    println!("Initializing Focus...\n");

    let db = open_database()?;
    println!("Database ready at: {}", db_path()?.display());
    println!("Host log:          {}", host_log_path()?.display());

    let mut settings = db.get_settings()?;
    if let Some(topic) = topic {
        settings.study_topic = Some(validate_topic(topic)?.to_string());
        db.save_settings(&settings)?;
    }

    match settings.active_topic() {
        Some(topic) => println!("\nStudy topic: {topic}"),
        None => println!("\nNo study topic yet. Set one with: focus topic set \"<topic>\""),
    }

    let ai = db.get_ai_config()?;
    println!("AI provider: {} ({})", ai.provider, ai.effective_model());
    if ai.provider.api_key_env_vars().is_empty() || ai.effective_api_key().is_some() {
        println!("\nFocus is ready.");
    } else {
        println!(
            "\nNo API key found. Set one with: focus config set ai.api_key <key> (or export {})",
            ai.provider.api_key_env_vars().join(" / ")
        );
    }

    Ok(())
}
