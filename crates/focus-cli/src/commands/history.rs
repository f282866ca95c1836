/// History command handlers
use anyhow::Result;
use focus_storage::{AnalyzedPageRecord, NavigationRecord};
use tabled::{Table, Tabled};

use super::helpers::{open_database, truncate_str};

const URL_WIDTH: usize = 60;

#[derive(Tabled)]
struct NavigationRow {
    #[tabled(rename = "#")]
    id: i64,
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Tab")]
    tab: i64,
    #[tabled(rename = "URL")]
    url: String,
}

impl From<&NavigationRecord> for NavigationRow {
    fn from(record: &NavigationRecord) -> Self {
        Self {
            id: record.id,
            time: record.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            tab: record.tab_id,
            url: truncate_str(&record.url, URL_WIDTH),
        }
    }
}

#[derive(Tabled)]
struct AnalysisRow {
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Score")]
    score: String,
    #[tabled(rename = "Relevant")]
    relevant: &'static str,
    #[tabled(rename = "URL")]
    url: String,
    #[tabled(rename = "Summary")]
    summary: String,
}

impl From<&AnalyzedPageRecord> for AnalysisRow {
    fn from(record: &AnalyzedPageRecord) -> Self {
        let verdict = &record.verdict;
        Self {
            time: record.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            score: if verdict.is_fail_open() {
                "-".to_string()
            } else {
                format!("{:.2}", verdict.relevance_score())
            },
            relevant: if record.is_relevant() { "yes" } else { "no" },
            url: truncate_str(&record.url, URL_WIDTH),
            summary: truncate_str(verdict.summary(), 40),
        }
    }
}

pub fn show_navigations(limit: usize) -> Result<()> {
    let db = open_database()?;
    let records = db.recent_navigations(limit)?;
    if records.is_empty() {
        println!("No navigations recorded yet");
        return Ok(());
    }

    let rows: Vec<NavigationRow> = records.iter().map(NavigationRow::from).collect();
    println!("{}", Table::new(rows));
    println!("{} navigations recorded in total", db.navigation_count()?);
    Ok(())
}

pub fn show_analyses(limit: usize) -> Result<()> {
    let db = open_database()?;
    let records = db.recent_analyses(limit)?;
    if records.is_empty() {
        println!("No pages analysed yet");
        return Ok(());
    }

    let rows: Vec<AnalysisRow> = records.iter().map(AnalysisRow::from).collect();
    println!("{}", Table::new(rows));
    println!("{} pages analysed in total", db.analysis_count()?);
    Ok(())
}
