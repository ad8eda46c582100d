use super::filename::ARTWORK_EXTENSION;
use super::store::ArtworkStore;
use crate::error::PantryError;
use std::collections::BTreeSet;
use std::path::Path;
use tokio::fs;
use tracing::{info, warn};

/// A row whose file is gone from the artwork directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingFile {
    pub id: i64,
    pub filename: String,
}

/// Drift between the `artworks` table and the artwork directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// PNG files with no row, sorted by name.
    pub orphan_files: Vec<String>,
    /// Rows without a file, sorted by id.
    pub missing_files: Vec<MissingFile>,
}

impl ReconcileReport {
    pub fn is_clean(&self) -> bool {
        self.orphan_files.is_empty() && self.missing_files.is_empty()
    }
}

impl ArtworkStore {
    /// Compare rows against directory contents. Detection only; nothing is removed.
    pub async fn reconcile(&self) -> Result<ReconcileReport, PantryError> {
        let on_disk = list_png_files(&self.art_dir).await?;
        let rows = self.db().list_filenames().await?;

        let referenced: BTreeSet<&str> = rows.iter().map(|(_, name)| name.as_str()).collect();

        let orphan_files = on_disk
            .iter()
            .filter(|name| !referenced.contains(name.as_str()))
            .cloned()
            .collect();

        let missing_files = rows
            .iter()
            .filter(|(_, name)| !on_disk.contains(name))
            .map(|(id, name)| MissingFile {
                id: *id,
                filename: name.clone(),
            })
            .collect();

        let report = ReconcileReport {
            orphan_files,
            missing_files,
        };

        if report.is_clean() {
            info!(rows = rows.len(), files = on_disk.len(), "Artwork store is consistent");
        } else {
            for name in &report.orphan_files {
                warn!(filename = %name, "Orphaned artwork file has no row");
            }
            for missing in &report.missing_files {
                warn!(id = missing.id, filename = %missing.filename, "Artwork row has no file");
            }
        }

        Ok(report)
    }
}

async fn list_png_files(dir: &Path) -> Result<BTreeSet<String>, PantryError> {
    let mut names = BTreeSet::new();
    let mut entries = fs::read_dir(dir).await.map_err(PantryError::StorageRead)?;

    while let Some(entry) = entries.next_entry().await.map_err(PantryError::StorageRead)? {
        let file_type = entry.file_type().await.map_err(PantryError::StorageRead)?;
        if !file_type.is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some(ARTWORK_EXTENSION) {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            names.insert(name.to_string());
        }
    }

    Ok(names)
}
