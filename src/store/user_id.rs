use serde::{Deserialize, Serialize};
use std::fmt;

use super::StoreError;

/// Longest identity accepted as a storage key.
pub const MAX_USER_ID_LEN: usize = 128;

fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// A storage key derived from a client identity.
///
/// Only `[A-Za-z0-9_-]` is ever allowed through, so a `UserId` can be used
/// directly as a file name without path traversal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Strictly parses an identity, rejecting any disallowed character.
    pub fn parse(raw: &str) -> Result<Self, StoreError> {
        if raw.is_empty() || raw.len() > MAX_USER_ID_LEN || !raw.chars().all(is_key_char) {
            return Err(StoreError::InvalidUserId(raw.to_string()));
        }
        Ok(Self(raw.to_string()))
    }

    /// Strips disallowed characters and truncates. Returns `None` when
    /// nothing usable remains.
    pub fn sanitize(raw: &str) -> Option<Self> {
        let cleaned: String = raw
            .chars()
            .filter(|c| is_key_char(*c))
            .take(MAX_USER_ID_LEN)
            .collect();
        if cleaned.is_empty() {
            None
        } else {
            Some(Self(cleaned))
        }
    }

    /// A fresh random identity. base64url output is always a valid key.
    pub(crate) fn generate() -> Self {
        Self(crate::identity::generate_token())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for UserId {
    type Error = StoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}
