//! SQL DDL for initializing the database schema.

/// SQLite schema includes:
/// - `artworks` table (one stored PNG per row, `filename` relative to the art directory)
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS artworks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    filename TEXT NOT NULL UNIQUE,
    width INTEGER NOT NULL,
    height INTEGER NOT NULL,
    created_at TEXT NOT NULL -- RFC3339, UTC, fixed microsecond width
);

CREATE INDEX IF NOT EXISTS idx_artworks_created_at ON artworks(created_at);
"#;
