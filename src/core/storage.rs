//! Member photo storage - A local object store laid out as `root/bucket/path`
//! and served under a public base URL.

use crate::{
    core::membre,
    entities::MembreModel,
    errors::{Error, Result},
};
use sea_orm::DatabaseConnection;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};

/// Bucket holding member photos
pub const PHOTO_BUCKET: &str = "photos";

/// Largest accepted photo, in bytes
pub const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;

/// Accepted photo extensions, lowercase
pub const PHOTO_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];

/// Object store rooted in a local directory.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
    public_base: String,
}

fn storage_err(message: impl Into<String>) -> Error {
    Error::Storage {
        message: message.into(),
    }
}

/// Rejects empty, absolute or parent-relative object keys
fn check_key(key: &str) -> Result<()> {
    let path = Path::new(key);
    let safe = !key.is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
    if !safe {
        return Err(storage_err(format!("Chemin d'objet invalide : {key}")));
    }
    Ok(())
}

impl LocalObjectStore {
    /// Creates a store; directories are created on first upload.
    pub fn new(root: impl Into<PathBuf>, public_base: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base: public_base.into().trim_end_matches('/').to_string(),
        }
    }

    fn object_path(&self, bucket: &str, path: &str) -> Result<PathBuf> {
        check_key(bucket)?;
        check_key(path)?;
        Ok(self.root.join(bucket).join(path))
    }

    /// Writes `bytes` at `bucket/path`, replacing any existing object.
    pub async fn upload(&self, bucket: &str, path: &str, bytes: &[u8]) -> Result<()> {
        let target = self.object_path(bucket, path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, bytes).await?;
        debug!("Stored {} bytes at {}", bytes.len(), target.display());
        Ok(())
    }

    /// Public URL of an object
    #[must_use]
    pub fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/{bucket}/{path}", self.public_base)
    }

    /// Object paths directly under `prefix` in `bucket`, sorted.
    ///
    /// A missing prefix directory yields an empty list.
    pub async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<String>> {
        let dir = self.object_path(bucket, prefix)?;
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                paths.push(format!("{prefix}/{}", entry.file_name().to_string_lossy()));
            }
        }
        paths.sort();
        Ok(paths)
    }

    /// Removes objects; already missing ones are skipped. Returns how many were deleted.
    pub async fn remove(&self, bucket: &str, paths: &[String]) -> Result<usize> {
        let mut removed = 0;
        for path in paths {
            match tokio::fs::remove_file(self.object_path(bucket, path)?).await {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(removed)
    }
}

/// Lowercase extension of an accepted photo file.
///
/// # Errors
/// Returns [`Error::Storage`] for an unsupported extension or a file over 5 MiB.
pub fn validate_photo(file_name: &str, size: usize) -> Result<String> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    if !PHOTO_EXTENSIONS.contains(&extension.as_str()) {
        return Err(storage_err(format!(
            "Format non supporté pour {file_name} (acceptés : {})",
            PHOTO_EXTENSIONS.join(", ")
        )));
    }
    if size > MAX_PHOTO_BYTES {
        return Err(storage_err(format!(
            "Photo trop volumineuse : {size} octets (maximum {MAX_PHOTO_BYTES})"
        )));
    }
    Ok(extension)
}

/// Replaces a member's photo and stores its public URL on the member.
pub async fn upload_member_photo(
    db: &DatabaseConnection,
    store: &LocalObjectStore,
    membre_id: i64,
    file_name: &str,
    bytes: &[u8],
) -> Result<MembreModel> {
    let extension = validate_photo(file_name, bytes.len())?;
    let membre = membre::require_membre(db, membre_id).await?;

    let prefix = membre.id.to_string();
    let previous = store.list(PHOTO_BUCKET, &prefix).await?;
    store.remove(PHOTO_BUCKET, &previous).await?;

    let path = format!("{prefix}/{}.{extension}", uuid::Uuid::new_v4());
    store.upload(PHOTO_BUCKET, &path, bytes).await?;
    let url = store.public_url(PHOTO_BUCKET, &path);

    let updated = membre::set_photo_url(db, membre.id, Some(url)).await?;
    info!(
        "Photo of {} replaced ({} previous removed)",
        updated.nom_complet(),
        previous.len()
    );
    Ok(updated)
}

/// Deletes every photo of a member and clears the URL.
pub async fn remove_member_photo(
    db: &DatabaseConnection,
    store: &LocalObjectStore,
    membre_id: i64,
) -> Result<MembreModel> {
    let membre = membre::require_membre(db, membre_id).await?;
    let previous = store.list(PHOTO_BUCKET, &membre.id.to_string()).await?;
    store.remove(PHOTO_BUCKET, &previous).await?;
    membre::set_photo_url(db, membre.id, None).await
}
