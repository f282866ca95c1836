use anyhow::Result;
use rusqlite::params;

use crate::models::{NavigationEvent, NavigationRecord};

use super::helpers::parse_datetime;
use super::Database;

impl Database {
    /// Append a navigation to the history log and return its id
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert operation fails
    pub fn insert_navigation(&self, event: &NavigationEvent) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO navigation_history (url, timestamp, tab_id) VALUES (?1, ?2, ?3)",
            params![event.url, event.timestamp.to_rfc3339(), event.tab_id],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Most recent navigations, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub fn recent_navigations(&self, limit: usize) -> Result<Vec<NavigationRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, url, timestamp, tab_id
             FROM navigation_history
             ORDER BY id DESC
             LIMIT ?1",
        )?;

        let records = stmt
            .query_map(params![i64::try_from(limit).unwrap_or(i64::MAX)], |row| {
                Ok(NavigationRecord {
                    id: row.get(0)?,
                    url: row.get(1)?,
                    timestamp: parse_datetime(2, &row.get::<_, String>(2)?)?,
                    tab_id: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    /// Total number of logged navigations
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub fn navigation_count(&self) -> Result<usize> {
        let count: i64 =
            self.conn()?
                .query_row("SELECT COUNT(*) FROM navigation_history", [], |row| {
                    row.get(0)
                })?;
        Ok(usize::try_from(count).unwrap_or_default())
    }
}
