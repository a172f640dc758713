//! SQL DDL for the APOD table.

/// SQLite schema with:
/// - `id` INTEGER PRIMARY KEY AUTOINCREMENT
/// - the five `DailyRecord` fields
/// - `date` UNIQUE, the business key (ISO-8601 text, `YYYY-MM-DD`)
///
/// `date` is declared TEXT because SQLite's DATE affinity would coerce
/// numeric-looking values to integers.
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS apod_data (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title VARCHAR(255) NOT NULL,
    explanation TEXT NOT NULL,
    url TEXT NOT NULL,
    date TEXT NOT NULL UNIQUE,
    media_type VARCHAR(50) NOT NULL
);
"#;
