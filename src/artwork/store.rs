use super::data_url::decode_png_data_url;
use super::filename::generate_filename;
use super::model::Artwork;
use crate::db::{DbActorHandle, NewArtwork};
use crate::error::PantryError;
use chrono::{DateTime, Utc};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::{fs, io::AsyncWriteExt};
use tracing::{debug, info, warn};

const MAX_FILENAME_ATTEMPTS: usize = 3;
const DEFAULT_LIST_LIMIT: u32 = 100;
const MAX_LIST_LIMIT: u32 = 1000;

/// Coordinates the artwork directory and the `artworks` table as one resource.
///
/// Writes go file first, row second; deletes go file first (absence tolerated), row second.
/// Neither pair is atomic: a crash in between leaves an orphan that [`ArtworkStore::reconcile`]
/// reports.
#[derive(Clone)]
pub struct ArtworkStore {
    db: DbActorHandle,
    pub(super) art_dir: Arc<Path>,
    default_list_limit: u32,
    max_list_limit: u32,
}

impl ArtworkStore {
    /// Bind a store to `art_dir`, creating the directory if needed.
    pub async fn open(db: DbActorHandle, art_dir: impl Into<PathBuf>) -> Result<Self, PantryError> {
        let art_dir: PathBuf = art_dir.into();
        fs::create_dir_all(&art_dir)
            .await
            .map_err(PantryError::StorageWrite)?;

        Ok(Self {
            db,
            art_dir: Arc::from(art_dir),
            default_list_limit: DEFAULT_LIST_LIMIT,
            max_list_limit: MAX_LIST_LIMIT,
        })
    }

    /// Override the listing bounds. `max` is raised to `default` if it is smaller.
    #[must_use]
    pub fn with_list_limits(mut self, default: u32, max: u32) -> Self {
        self.default_list_limit = default.max(1);
        self.max_list_limit = max.max(self.default_list_limit);
        self
    }

    pub fn db(&self) -> &DbActorHandle {
        &self.db
    }

    /// Decode a PNG data URL, write the bytes to a fresh file, then insert the row.
    pub async fn create(
        &self,
        data_url: &str,
        width: i64,
        height: i64,
    ) -> Result<Artwork, PantryError> {
        let bytes = decode_png_data_url(data_url)?;
        let now = Utc::now();
        let filename = self.write_new_file(&bytes, now).await?;

        let new = NewArtwork {
            filename: filename.clone(),
            width,
            height,
            created_at: now,
        };

        match self.db.insert_artwork(new).await {
            Ok(row) => {
                info!(
                    id = row.id,
                    filename = %row.filename,
                    width,
                    height,
                    bytes = bytes.len(),
                    "Artwork stored"
                );
                Ok(row.into())
            }
            Err(e) => {
                // The file stays behind; reconcile reports it as an orphan.
                warn!(filename = %filename, error = %e, "Artwork row insert failed after file write");
                Err(e)
            }
        }
    }

    /// Newest first. `None` uses the configured default; `Some(0)` is rejected.
    pub async fn list(&self, limit: Option<u32>) -> Result<Vec<Artwork>, PantryError> {
        let limit = match limit {
            None => self.default_list_limit,
            Some(0) => return Err(PantryError::InvalidLimit),
            Some(n) => n.min(self.max_list_limit),
        };

        let rows = self.db.list_artworks(limit).await?;
        Ok(rows.into_iter().map(Artwork::from).collect())
    }

    /// Raw PNG bytes for `id`. The caller attaches the content type.
    pub async fn get(&self, id: i64) -> Result<Vec<u8>, PantryError> {
        let row = self
            .db
            .get_artwork(id)
            .await?
            .ok_or(PantryError::NotFound(id))?;

        match fs::read(self.art_dir.join(&row.filename)).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!(id, filename = %row.filename, "Artwork row exists but file is missing");
                Err(PantryError::FileMissing { id })
            }
            Err(e) => Err(PantryError::StorageRead(e)),
        }
    }

    /// Remove the file (if still there) and then the row.
    pub async fn delete(&self, id: i64) -> Result<(), PantryError> {
        let row = self
            .db
            .get_artwork(id)
            .await?
            .ok_or(PantryError::NotFound(id))?;

        match fs::remove_file(self.art_dir.join(&row.filename)).await {
            Ok(()) => debug!(id, filename = %row.filename, "Artwork file removed"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(id, filename = %row.filename, "Artwork file already absent");
            }
            Err(e) => {
                warn!(id, filename = %row.filename, error = %e, "Failed to remove artwork file; removing row anyway");
            }
        }

        // A concurrent delete may have won between the lookup and here.
        if !self.db.delete_artwork(id).await? {
            return Err(PantryError::NotFound(id));
        }

        info!(id, filename = %row.filename, "Artwork deleted");
        Ok(())
    }

    async fn write_new_file(&self, bytes: &[u8], now: DateTime<Utc>) -> Result<String, PantryError> {
        let mut last_err = None;
        for _ in 0..MAX_FILENAME_ATTEMPTS {
            let filename = generate_filename(now);
            let path = self.art_dir.join(&filename);
            match write_create_new(&path, bytes).await {
                Ok(()) => return Ok(filename),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    warn!(filename = %filename, "Artwork filename collision; regenerating");
                    last_err = Some(e);
                }
                Err(e) => return Err(PantryError::StorageWrite(e)),
            }
        }
        Err(PantryError::StorageWrite(last_err.unwrap_or_else(|| {
            io::Error::from(io::ErrorKind::AlreadyExists)
        })))
    }
}

/// Write `bytes` to a file that must not exist yet. A partially written file is removed.
async fn write_create_new(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;

    let written = async {
        file.write_all(bytes).await?;
        file.flush().await
    }
    .await;

    if let Err(e) = written {
        drop(file);
        let _ = fs::remove_file(path).await;
        return Err(e);
    }
    Ok(())
}
