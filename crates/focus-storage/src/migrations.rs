use anyhow::Result;
use rusqlite::Connection;

/// Initialize database schema
///
/// # Errors
///
/// Returns an error if database table creation or index creation fails
pub fn init_schema(conn: &Connection) -> Result<()> {
    // Navigation history - one row per completed main-frame navigation
    conn.execute(
        "CREATE TABLE IF NOT EXISTS navigation_history (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            url TEXT NOT NULL,
            timestamp TEXT NOT NULL,
            tab_id INTEGER NOT NULL
        )",
        [],
    )?;

    // Analyzed pages - latest verdict per URL
    conn.execute(
        "CREATE TABLE IF NOT EXISTS analyzed_pages (
            url TEXT PRIMARY KEY,
            timestamp TEXT NOT NULL,
            relevance_score REAL NOT NULL,
            summary TEXT NOT NULL,
            explanation TEXT NOT NULL,
            fail_open INTEGER NOT NULL DEFAULT 0,
            is_relevant INTEGER NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS settings (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            study_topic TEXT,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS ai_config (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            provider TEXT NOT NULL DEFAULT 'google',
            model TEXT,
            api_key TEXT,
            base_url TEXT,
            enabled INTEGER NOT NULL DEFAULT 1,
            timeout_secs INTEGER NOT NULL DEFAULT 30,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;

    create_indexes(conn)?;

    log::debug!("Database schema initialized");
    Ok(())
}

fn create_indexes(conn: &Connection) -> Result<()> {
    let indexes = [
        "CREATE INDEX IF NOT EXISTS idx_navigation_url ON navigation_history(url)",
        "CREATE INDEX IF NOT EXISTS idx_navigation_timestamp ON navigation_history(timestamp)",
        "CREATE INDEX IF NOT EXISTS idx_analyzed_timestamp ON analyzed_pages(timestamp)",
        "CREATE INDEX IF NOT EXISTS idx_analyzed_relevant ON analyzed_pages(is_relevant)",
    ];
    for sql in indexes {
        conn.execute(sql, [])?;
    }
    Ok(())
}
