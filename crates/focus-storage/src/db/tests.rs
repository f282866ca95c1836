use super::*;
use crate::models::{AiConfig, AiProvider, AnalyzedPageRecord, NavigationEvent, RelevanceVerdict, Settings};
use chrono::Utc;

fn nav(url: &str, tab_id: i64) -> NavigationEvent {
    NavigationEvent {
        url: url.to_string(),
        tab_id,
        frame_id: 0,
        timestamp: Utc::now(),
    }
}

// ============================================================================
// Navigation log
// ============================================================================

#[test]
fn test_insert_navigation_appends_with_increasing_ids() {
    let db = Database::open_in_memory().unwrap();

    let first = db.insert_navigation(&nav("https://a.example", 1)).unwrap();
    let second = db.insert_navigation(&nav("https://a.example", 1)).unwrap();

    assert!(second > first);
    assert_eq!(db.navigation_count().unwrap(), 2);
}

#[test]
fn test_recent_navigations_newest_first() {
    let db = Database::open_in_memory().unwrap();
    db.insert_navigation(&nav("https://first.example", 1)).unwrap();
    db.insert_navigation(&nav("https://second.example", 2)).unwrap();
    db.insert_navigation(&nav("https://third.example", 3)).unwrap();

    let records = db.recent_navigations(2).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].url, "https://third.example");
    assert_eq!(records[0].tab_id, 3);
    assert_eq!(records[1].url, "https://second.example");
}

// ============================================================================
// Analysis store
// ============================================================================

#[test]
fn test_upsert_analysis_replaces_by_url() {
    let db = Database::open_in_memory().unwrap();
    let url = "https://chem.example/alkenes";

    let first = AnalyzedPageRecord::new(
        url.to_string(),
        RelevanceVerdict::from_score(0.2, "Cooking".to_string(), "Unrelated".to_string()),
    );
    db.upsert_analysis(&first).unwrap();

    let second = AnalyzedPageRecord::new(
        url.to_string(),
        RelevanceVerdict::from_score(0.9, "Alkenes".to_string(), "On topic".to_string()),
    );
    db.upsert_analysis(&second).unwrap();

    assert_eq!(db.analysis_count().unwrap(), 1);
    let stored = db.get_analysis(url).unwrap().unwrap();
    assert!(stored.is_relevant());
    assert_eq!(stored.verdict.summary(), "Alkenes");
    assert!((stored.verdict.relevance_score() - 0.9).abs() < 1e-9);
}

#[test]
fn test_fail_open_analysis_round_trips() {
    let db = Database::open_in_memory().unwrap();
    let record = AnalyzedPageRecord::new(
        "https://down.example".to_string(),
        RelevanceVerdict::fail_open(),
    );
    db.upsert_analysis(&record).unwrap();

    let stored = db.get_analysis("https://down.example").unwrap().unwrap();
    assert!(stored.verdict.is_fail_open());
    assert!(stored.is_relevant());
}

#[test]
fn test_get_analysis_missing_url() {
    let db = Database::open_in_memory().unwrap();
    assert!(db.get_analysis("https://nowhere.example").unwrap().is_none());
}

#[test]
fn test_distinct_urls_are_separate_records() {
    let db = Database::open_in_memory().unwrap();
    for url in ["https://a.example", "https://b.example"] {
        db.upsert_analysis(&AnalyzedPageRecord::new(
            url.to_string(),
            RelevanceVerdict::from_score(0.7, String::new(), String::new()),
        ))
        .unwrap();
    }
    assert_eq!(db.analysis_count().unwrap(), 2);
    assert_eq!(db.recent_analyses(10).unwrap().len(), 2);
}

// ============================================================================
// Settings and AI config
// ============================================================================

#[test]
fn test_settings_default_then_saved() {
    let db = Database::open_in_memory().unwrap();
    assert_eq!(db.get_settings().unwrap(), Settings::default());

    db.save_settings(&Settings {
        study_topic: Some("organic chemistry".to_string()),
    })
    .unwrap();
    assert_eq!(
        db.get_settings().unwrap().active_topic(),
        Some("organic chemistry")
    );
}

#[test]
fn test_ai_config_update_fields() {
    let db = Database::open_in_memory().unwrap();
    assert_eq!(db.get_ai_config().unwrap(), AiConfig::default());

    db.update_ai_config_field("provider", Some("ollama")).unwrap();
    db.update_ai_config_field("model", Some("mistral")).unwrap();
    db.update_ai_config_field("timeout_secs", Some("12")).unwrap();
    db.update_ai_config_field("enabled", Some("off")).unwrap();

    let config = db.get_ai_config().unwrap();
    assert_eq!(config.provider, AiProvider::Ollama);
    assert_eq!(config.model.as_deref(), Some("mistral"));
    assert_eq!(config.timeout_secs, 12);
    assert!(!config.enabled);

    db.update_ai_config_field("model", None).unwrap();
    assert_eq!(db.get_ai_config().unwrap().model, None);
}

#[test]
fn test_ai_config_rejects_bad_values() {
    let db = Database::open_in_memory().unwrap();
    assert!(db.update_ai_config_field("provider", Some("nope")).is_err());
    assert!(db.update_ai_config_field("timeout_secs", Some("soon")).is_err());
    assert!(db.update_ai_config_field("colour", Some("blue")).is_err());
}

#[test]
fn test_database_on_disk_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("focus.db");

    {
        let db = Database::new(&path).unwrap();
        db.insert_navigation(&nav("https://persist.example", 9)).unwrap();
    }

    let reopened = Database::new(&path).unwrap();
    assert_eq!(reopened.navigation_count().unwrap(), 1);
}
