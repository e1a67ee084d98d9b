//! Per-user JSON document storage.
//!
//! Documents are stored in the following structure:
//! ```text
//! <DATA_DIR>/
//!   users/
//!     <user_id>.json
//!   backups/
//!     <user_id>/
//!       <YYYYMMDD_HHMMSS>.json
//! ```

mod document_store;
mod locks;
mod user_id;

pub use document_store::DocumentStore;
pub use locks::UserLocks;
pub use user_id::{UserId, MAX_USER_ID_LEN};

use std::io;
use std::path::PathBuf;

/// Errors that can occur during document storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// I/O error reading or writing a file.
    #[error("I/O error for {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The persisted bytes are not a valid document.
    #[error("Corrupt document {}: {}", .path.display(), .source)]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// Identity contains characters not allowed in a storage key.
    #[error("Invalid user ID: {0}")]
    InvalidUserId(String),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}
