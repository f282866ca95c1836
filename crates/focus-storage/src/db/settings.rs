use anyhow::Result;
use rusqlite::{params, OptionalExtension};

use crate::models::Settings;

use super::Database;

impl Database {
    /// Load user settings, falling back to defaults when none are stored
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub fn get_settings(&self) -> Result<Settings> {
        let study_topic = self
            .conn()?
            .query_row("SELECT study_topic FROM settings WHERE id = 1", [], |row| {
                row.get::<_, Option<String>>(0)
            })
            .optional()?
            .flatten();
        Ok(Settings { study_topic })
    }

    /// Persist user settings
    ///
    /// # Errors
    ///
    /// Returns an error if the database write fails
    pub fn save_settings(&self, settings: &Settings) -> Result<()> {
        self.conn()?.execute(
            "INSERT INTO settings (id, study_topic, updated_at)
             VALUES (1, ?1, datetime('now'))
             ON CONFLICT(id) DO UPDATE SET
                study_topic = excluded.study_topic,
                updated_at = excluded.updated_at",
            params![settings.study_topic],
        )?;
        log::debug!("Saved settings: study_topic={:?}", settings.study_topic);
        Ok(())
    }
}
