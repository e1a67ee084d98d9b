//! Identity resolution for incoming requests.
//!
//! This is not authentication. Any client presenting a token, forged or not,
//! is treated as the user that token names. The `api_key` strategy only
//! restricts which tokens are accepted.

use axum::http::{header, HeaderMap};
use rand::Rng;
use std::collections::HashMap;

use crate::store::UserId;

/// Identity cookies live for a year.
pub const COOKIE_MAX_AGE_SECS: u64 = 365 * 24 * 60 * 60;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum IdentityError {
    #[error("Authorization header required")]
    MissingAuth,

    #[error("Authorization header must use Bearer scheme")]
    InvalidScheme,

    #[error("Invalid API key")]
    InvalidKey,
}

impl IdentityError {
    pub fn code(&self) -> &'static str {
        match self {
            IdentityError::MissingAuth => "missing_auth",
            IdentityError::InvalidScheme => "invalid_auth",
            IdentityError::InvalidKey => "invalid_key",
        }
    }
}

/// Maps API keys to the users they identify.
#[derive(Debug, Clone, Default)]
pub struct ApiKeyTable {
    keys: HashMap<String, UserId>,
}

impl ApiKeyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, user: UserId) {
        self.keys.insert(key.into(), user);
    }

    pub fn validate(&self, key: &str) -> Option<&UserId> {
        self.keys.get(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// How a request is mapped to a user.
#[derive(Debug, Clone)]
pub enum IdentityStrategy {
    /// Every request is the same user.
    Fixed(UserId),
    /// An opaque token in the named cookie, minted on first visit.
    Cookie { name: String },
    /// `Authorization: Bearer <key>` looked up in a key table.
    ApiKey(ApiKeyTable),
}

/// The user a request resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIdentity {
    pub user_id: UserId,
    /// Set when a new token was minted; the caller must send it back.
    pub issued: Option<String>,
}

impl ResolvedIdentity {
    fn existing(user_id: UserId) -> Self {
        Self {
            user_id,
            issued: None,
        }
    }
}

impl IdentityStrategy {
    pub fn resolve(&self, headers: &HeaderMap) -> Result<ResolvedIdentity, IdentityError> {
        match self {
            IdentityStrategy::Fixed(user) => Ok(ResolvedIdentity::existing(user.clone())),
            IdentityStrategy::Cookie { name } => Ok(resolve_cookie(name, headers)),
            IdentityStrategy::ApiKey(keys) => {
                let auth_header = headers
                    .get(header::AUTHORIZATION)
                    .and_then(|h| h.to_str().ok())
                    .ok_or(IdentityError::MissingAuth)?;
                let key = auth_header
                    .strip_prefix("Bearer ")
                    .ok_or(IdentityError::InvalidScheme)?;
                keys.validate(key.trim())
                    .cloned()
                    .map(ResolvedIdentity::existing)
                    .ok_or(IdentityError::InvalidKey)
            }
        }
    }

    pub fn cookie_name(&self) -> Option<&str> {
        match self {
            IdentityStrategy::Cookie { name } => Some(name),
            _ => None,
        }
    }
}

fn resolve_cookie(name: &str, headers: &HeaderMap) -> ResolvedIdentity {
    if let Some(user) = cookie_value(headers, name).and_then(UserId::sanitize) {
        return ResolvedIdentity::existing(user);
    }

    let user_id = UserId::generate();
    ResolvedIdentity {
        issued: Some(user_id.to_string()),
        user_id,
    }
}

/// Finds `name` among all `Cookie` headers.
fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.trim().trim_matches('"'))
}

/// `Set-Cookie` value persisting a freshly minted identity token.
pub fn identity_cookie(name: &str, token: &str) -> String {
    format!(
        "{}={}; Max-Age={}; Path=/; HttpOnly; SameSite=Lax",
        name, token, COOKIE_MAX_AGE_SECS
    )
}

/// Generates a random URL-safe token (32 bytes, base64url encoded).
pub fn generate_token() -> String {
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

    let mut bytes = [0u8; 32];
    rand::rng().fill(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
