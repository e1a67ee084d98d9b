use chrono::NaiveDateTime;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use super::{StoreError, UserId};
use crate::models::{UserDocument, RECOGNIZED_KEYS};

const BACKUP_STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// File-backed store holding one JSON document per user.
///
/// A missing document is created on first load, seeded from the legacy
/// single-tenant file when one is configured and looks like a journal.
/// The store does no locking of its own; callers serialize access per user
/// (see [`crate::Journal`]).
#[derive(Debug, Clone)]
pub struct DocumentStore {
    data_dir: PathBuf,
    legacy_path: Option<PathBuf>,
}

impl DocumentStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            legacy_path: None,
        }
    }

    /// Uses `path` as a one-time seed for users that have no document yet.
    pub fn with_legacy_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.legacy_path = Some(path.into());
        self
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn users_dir(&self) -> PathBuf {
        self.data_dir.join("users")
    }

    /// Returns the full path for a user's document.
    pub fn doc_path(&self, user: &UserId) -> PathBuf {
        self.users_dir().join(format!("{}.json", user))
    }

    fn backup_dir(&self, user: &UserId) -> PathBuf {
        self.data_dir.join("backups").join(user.as_str())
    }

    /// Checks if a document exists for a user.
    pub fn exists(&self, user: &UserId) -> bool {
        self.doc_path(user).exists()
    }

    /// Loads a user's document, creating it first if it doesn't exist.
    pub fn load(&self, user: &UserId) -> Result<UserDocument, StoreError> {
        let path = self.doc_path(user);

        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                self.initialize(user, &path)?;
                fs::read(&path).map_err(|e| StoreError::io(&path, e))?
            }
            Err(e) => return Err(StoreError::io(path, e)),
        };

        let mut doc: UserDocument = serde_json::from_slice(&bytes)
            .map_err(|source| StoreError::Corrupt { path: path.clone(), source })?;
        doc.normalize();

        tracing::debug!(user = %user, meals = doc.meals.len(), "loaded document");
        Ok(doc)
    }

    /// Writes the initial document for a new user.
    fn initialize(&self, user: &UserId, path: &Path) -> Result<(), StoreError> {
        match self.legacy_seed()? {
            Some((legacy, bytes)) => {
                write_atomic(path, &bytes)?;
                tracing::info!(
                    user = %user,
                    legacy = %legacy.display(),
                    "migrated legacy document"
                );
            }
            None => {
                let bytes = serialize(&UserDocument::default(), path)?;
                write_atomic(path, &bytes)?;
                tracing::info!(user = %user, "created new document");
            }
        }
        Ok(())
    }

    /// Reads the legacy document if it exists and is structurally plausible:
    /// a JSON object with at least one recognized top-level key.
    fn legacy_seed(&self) -> Result<Option<(PathBuf, Vec<u8>)>, StoreError> {
        let Some(legacy) = &self.legacy_path else {
            return Ok(None);
        };

        let bytes = match fs::read(legacy) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::io(legacy, e)),
        };

        let plausible = serde_json::from_slice::<serde_json::Value>(&bytes)
            .ok()
            .and_then(|value| {
                value
                    .as_object()
                    .map(|map| RECOGNIZED_KEYS.iter().any(|key| map.contains_key(*key)))
            })
            .unwrap_or(false);

        if plausible {
            Ok(Some((legacy.clone(), bytes)))
        } else {
            tracing::warn!(
                legacy = %legacy.display(),
                "legacy document is not a journal, ignoring it"
            );
            Ok(None)
        }
    }

    /// Saves a user's document, fully replacing what was there.
    pub fn save(&self, user: &UserId, doc: &UserDocument) -> Result<(), StoreError> {
        let path = self.doc_path(user);
        let bytes = serialize(doc, &path)?;
        write_atomic(&path, &bytes)?;
        tracing::debug!(user = %user, bytes = bytes.len(), "saved document");
        Ok(())
    }

    /// Writes a timestamped copy of `doc` to the user's backup directory.
    ///
    /// Returns the path of the backup file.
    pub fn save_backup(
        &self,
        user: &UserId,
        doc: &UserDocument,
        now: NaiveDateTime,
    ) -> Result<PathBuf, StoreError> {
        let stamp = now.format(BACKUP_STAMP_FORMAT).to_string();
        let dir = self.backup_dir(user);

        let mut path = dir.join(format!("{}.json", stamp));
        let mut n = 1;
        while path.exists() {
            path = dir.join(format!("{}_{}.json", stamp, n));
            n += 1;
        }

        let bytes = serialize(doc, &path)?;
        write_atomic(&path, &bytes)?;
        tracing::info!(user = %user, backup = %path.display(), "wrote backup");
        Ok(path)
    }

    /// Lists a user's backups, oldest first.
    pub fn list_backups(&self, user: &UserId) -> Result<Vec<PathBuf>, StoreError> {
        let dir = self.backup_dir(user);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(dir, e)),
        };

        let mut backups = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io(&dir, e))?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                backups.push(path);
            }
        }
        backups.sort();
        Ok(backups)
    }
}

fn serialize(doc: &UserDocument, path: &Path) -> Result<Vec<u8>, StoreError> {
    serde_json::to_vec_pretty(doc).map_err(|e| StoreError::io(path, io::Error::other(e)))
}

/// Writes `bytes` to `path` via a uniquely named temp file + rename, so a
/// reader sees either the old or the new content, never a partial file.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    write_atomic_with(path, bytes, |temp, target| fs::rename(temp, target))
}

/// Writes and syncs a temp file, then hands it to `commit` to move it over
/// `path`. The temp file is removed if any step fails.
fn write_atomic_with<F>(path: &Path, bytes: &[u8], commit: F) -> Result<(), StoreError>
where
    F: FnOnce(&Path, &Path) -> io::Result<()>,
{
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
    }

    let temp_path = path.with_extension(format!("{}.tmp", Uuid::new_v4().simple()));

    let result = (|| {
        let mut file = File::create(&temp_path)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        commit(&temp_path, path)
    })();

    if let Err(e) = result {
        let _ = fs::remove_file(&temp_path);
        return Err(StoreError::io(path, e));
    }

    Ok(())
}
