use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct DbArtwork {
    pub id: i64,
    pub filename: String,
    pub width: i64,
    pub height: i64,
    pub created_at: DateTime<Utc>,
}

/// Insert payload; `id` is assigned by SQLite.
#[derive(Debug, Clone)]
pub struct NewArtwork {
    pub filename: String,
    pub width: i64,
    pub height: i64,
    pub created_at: DateTime<Utc>,
}
