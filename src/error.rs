use crate::models::ValidationError;
use crate::store::StoreError;

/// Errors returned by journal operations.
#[derive(Debug, thiserror::Error)]
pub enum JournalError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl JournalError {
    pub fn not_found(what: impl Into<String>) -> Self {
        JournalError::NotFound(what.into())
    }

    /// Stable machine-readable name for the failure.
    pub fn kind(&self) -> &'static str {
        match self {
            JournalError::Store(StoreError::Io { .. }) => "store_io",
            JournalError::Store(StoreError::Corrupt { .. }) => "store_corrupt",
            JournalError::Store(StoreError::InvalidUserId(_)) => "validation",
            JournalError::Validation(_) => "validation",
            JournalError::NotFound(_) => "not_found",
        }
    }
}

pub type Result<T> = std::result::Result<T, JournalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        let err: JournalError = ValidationError::new("bad").into();
        assert_eq!(err.kind(), "validation");
        assert_eq!(err.to_string(), "Validation error: bad");

        assert_eq!(JournalError::not_found("meal 3").kind(), "not_found");

        let err: JournalError = StoreError::io("/tmp/x", std::io::Error::other("disk")).into();
        assert_eq!(err.kind(), "store_io");
        assert!(err.to_string().contains("/tmp/x"));
    }
}
