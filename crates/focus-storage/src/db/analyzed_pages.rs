use anyhow::Result;
use rusqlite::{params, OptionalExtension, Row};

use crate::models::{AnalyzedPageRecord, RelevanceVerdict};

use super::helpers::parse_datetime;
use super::Database;

const SELECT_COLUMNS: &str =
    "SELECT url, timestamp, relevance_score, summary, explanation, fail_open FROM analyzed_pages";

impl Database {
    /// Insert or replace the analysis for a URL
    ///
    /// # Errors
    ///
    /// Returns an error if the database write fails
    pub fn upsert_analysis(&self, record: &AnalyzedPageRecord) -> Result<()> {
        let verdict = &record.verdict;
        self.conn()?.execute(
            "INSERT INTO analyzed_pages
                (url, timestamp, relevance_score, summary, explanation, fail_open, is_relevant)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(url) DO UPDATE SET
                timestamp = excluded.timestamp,
                relevance_score = excluded.relevance_score,
                summary = excluded.summary,
                explanation = excluded.explanation,
                fail_open = excluded.fail_open,
                is_relevant = excluded.is_relevant",
            params![
                record.url,
                record.timestamp.to_rfc3339(),
                verdict.relevance_score(),
                verdict.summary(),
                verdict.explanation(),
                verdict.is_fail_open(),
                record.is_relevant(),
            ],
        )?;
        Ok(())
    }

    /// Look up the stored analysis for a URL
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub fn get_analysis(&self, url: &str) -> Result<Option<AnalyzedPageRecord>> {
        let record = self
            .conn()?
            .query_row(
                &format!("{SELECT_COLUMNS} WHERE url = ?1"),
                params![url],
                Self::row_to_analysis,
            )
            .optional()?;
        Ok(record)
    }

    /// Most recently analysed pages, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub fn recent_analyses(&self, limit: usize) -> Result<Vec<AnalyzedPageRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "{SELECT_COLUMNS} ORDER BY timestamp DESC LIMIT ?1"
        ))?;
        let records = stmt
            .query_map(
                params![i64::try_from(limit).unwrap_or(i64::MAX)],
                Self::row_to_analysis,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// Number of distinct analysed URLs
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub fn analysis_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn()?
            .query_row("SELECT COUNT(*) FROM analyzed_pages", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    fn row_to_analysis(row: &Row<'_>) -> rusqlite::Result<AnalyzedPageRecord> {
        let fail_open: bool = row.get(5)?;
        let verdict = if fail_open {
            RelevanceVerdict::fail_open()
        } else {
            RelevanceVerdict::from_score(row.get(2)?, row.get(3)?, row.get(4)?)
        };
        Ok(AnalyzedPageRecord {
            url: row.get(0)?,
            timestamp: parse_datetime(1, &row.get::<_, String>(1)?)?,
            verdict,
        })
    }
}
