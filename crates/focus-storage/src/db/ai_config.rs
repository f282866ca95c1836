//! AI configuration database operations

use anyhow::{bail, Result};
use rusqlite::{params, OptionalExtension};

use crate::models::{AiConfig, AiProvider};

use super::Database;

impl Database {
    /// Get AI configuration, or the default when none is stored
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub fn get_ai_config(&self) -> Result<AiConfig> {
        let row = self
            .conn()?
            .query_row(
                "SELECT provider, model, api_key, base_url, enabled, timeout_secs
                 FROM ai_config WHERE id = 1",
                [],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, Option<String>>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, Option<String>>(3)?,
                        row.get::<_, bool>(4)?,
                        row.get::<_, i64>(5)?,
                    ))
                },
            )
            .optional()?;

        let Some((provider, model, api_key, base_url, enabled, timeout_secs)) = row else {
            return Ok(AiConfig::default());
        };

        Ok(AiConfig {
            provider: AiProvider::parse_provider(&provider).unwrap_or_default(),
            model,
            api_key,
            base_url,
            enabled,
            timeout_secs: u64::try_from(timeout_secs).unwrap_or_default(),
        })
    }

    /// Save AI configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the database write fails
    pub fn save_ai_config(&self, config: &AiConfig) -> Result<()> {
        self.conn()?.execute(
            "INSERT INTO ai_config (id, provider, model, api_key, base_url, enabled, timeout_secs, updated_at)
             VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, datetime('now'))
             ON CONFLICT(id) DO UPDATE SET
                provider = excluded.provider,
                model = excluded.model,
                api_key = excluded.api_key,
                base_url = excluded.base_url,
                enabled = excluded.enabled,
                timeout_secs = excluded.timeout_secs,
                updated_at = excluded.updated_at",
            params![
                config.provider.to_string(),
                config.model,
                config.api_key,
                config.base_url,
                config.enabled,
                i64::try_from(config.timeout_secs).unwrap_or(i64::MAX),
            ],
        )?;
        Ok(())
    }

    /// Update a single AI config field by key (`provider`, `model`, ...)
    ///
    /// A `None` value clears optional fields.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown keys, invalid values, or database failures
    pub fn update_ai_config_field(&self, key: &str, value: Option<&str>) -> Result<()> {
        let mut config = self.get_ai_config()?;
        let owned = value.map(str::to_string);

        match key {
            "provider" => {
                let Some(provider) = value.and_then(AiProvider::parse_provider) else {
                    bail!("Unknown provider: {}", value.unwrap_or_default());
                };
                config.provider = provider;
            }
            "model" => config.model = owned,
            "api_key" => config.api_key = owned,
            "base_url" => config.base_url = owned,
            "enabled" => {
                config.enabled = match value.map(str::to_lowercase).as_deref() {
                    Some("true" | "1" | "yes" | "on") => true,
                    Some("false" | "0" | "no" | "off") => false,
                    _ => bail!("Invalid boolean for ai.enabled: {}", value.unwrap_or_default()),
                };
            }
            "timeout_secs" => {
                config.timeout_secs = value
                    .unwrap_or_default()
                    .parse()
                    .map_err(|e| anyhow::anyhow!("Invalid ai.timeout_secs: {e}"))?;
            }
            _ => bail!("Unknown AI config key: {key}"),
        }

        self.save_ai_config(&config)
    }
}
