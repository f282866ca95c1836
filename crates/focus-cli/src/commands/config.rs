/// Configuration management command handlers
use anyhow::{bail, Result};
use focus_ai::RelevanceClassifier;
use focus_storage::{AiConfig, Database};

use super::helpers::{mask_secret, open_database};

const AI_PREFIX: &str = "ai.";

pub fn handle_config_get(key: &str) -> Result<()> {
    let db = open_database()?;
    match get_config_value(&db, key)? {
        Some(v) => println!("{key} = {v}"),
        None => println!("{key} is not set"),
    }
    Ok(())
}

pub fn handle_config_set(key: &str, value: &str) -> Result<()> {
    let db = open_database()?;
    set_config_value(&db, key, value)?;
    if key == "ai.api_key" {
        println!("Set {key} = {}", mask_secret(value));
    } else {
        println!("Set {key} = {value}");
    }
    Ok(())
}

pub async fn handle_config_show() -> Result<()> {
    let db = open_database()?;

    println!("Configuration:");
    println!("{}", "=".repeat(14));

    let settings = db.get_settings()?;
    println!("\n[study]");
    println!("  topic = {}", settings.active_topic().unwrap_or("(not set)"));

    let ai = db.get_ai_config()?;
    println!("\n[ai]");
    print_ai_config(&ai);

    let classifier = RelevanceClassifier::from_config(&ai);
    let status = match classifier.model_name() {
        Some(_) if classifier.is_available().await => "reachable",
        Some(_) => "unreachable (pages will be allowed)",
        None => "not configured (pages will be allowed)",
    };
    println!("  status = {status}");

    Ok(())
}

fn print_ai_config(ai: &AiConfig) {
    println!("  provider = {}", ai.provider);
    println!("  model = {}", ai.effective_model());
    println!("  base_url = {}", ai.effective_base_url());
    match ai.effective_api_key() {
        Some(key) => println!("  api_key = {}", mask_secret(&key)),
        None if ai.provider.api_key_env_vars().is_empty() => {}
        None => println!("  api_key = (not set)"),
    }
    println!("  enabled = {}", ai.enabled);
    println!("  timeout_secs = {}", ai.timeout_secs);
}

fn get_config_value(db: &Database, key: &str) -> Result<Option<String>> {
    if key == "topic" {
        return Ok(db.get_settings()?.study_topic);
    }
    let Some(field) = key.strip_prefix(AI_PREFIX) else {
        bail!("Unknown config key: {key}. Use 'topic' or 'ai.<field>'");
    };

    let ai = db.get_ai_config()?;
    let value = match field {
        "provider" => Some(ai.provider.to_string()),
        "model" => Some(ai.effective_model().to_string()),
        "base_url" => Some(ai.effective_base_url().to_string()),
        "api_key" => ai.effective_api_key().map(|k| mask_secret(&k)),
        "enabled" => Some(ai.enabled.to_string()),
        "timeout_secs" => Some(ai.timeout_secs.to_string()),
        _ => bail!("Unknown AI config key: {field}"),
    };
    Ok(value)
}

fn set_config_value(db: &Database, key: &str, value: &str) -> Result<()> {
    if key == "topic" {
        let topic = super::topic::validate_topic(value)?;
        let mut settings = db.get_settings()?;
        settings.study_topic = Some(topic.to_string());
        return db.save_settings(&settings);
    }
    let Some(field) = key.strip_prefix(AI_PREFIX) else {
        bail!("Unknown config key: {key}. Use 'topic' or 'ai.<field>'");
    };

    // An empty value clears optional fields
    let value = Some(value).filter(|v| !v.is_empty());
    db.update_ai_config_field(field, value)
}
