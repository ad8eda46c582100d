use crate::db::DbArtwork;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A stored artwork: metadata row plus the name of its PNG file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artwork {
    pub id: i64,
    pub filename: String,
    pub width: i64,
    pub height: i64,
    pub created_at: DateTime<Utc>,
}

impl Artwork {
    /// Path under which the HTTP layer serves this artwork's bytes.
    pub fn url(&self) -> String {
        format!("/api/art/{}", self.id)
    }
}

impl From<DbArtwork> for Artwork {
    fn from(row: DbArtwork) -> Self {
        Self {
            id: row.id,
            filename: row.filename,
            width: row.width,
            height: row.height,
            created_at: row.created_at,
        }
    }
}
