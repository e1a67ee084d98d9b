//! LeanFit Library
//!
//! Per-user nutrition and training journal: typed records stored as one JSON
//! document per user, a serialized read-modify-write journal over them, and
//! pure aggregation views for dashboards.

pub mod aggregate;
pub mod clock;
pub mod config;
pub mod error;
pub mod identity;
pub mod journal;
pub mod models;
pub mod server;
pub mod store;

pub use clock::Clock;
pub use config::{Config, ConfigError};
pub use error::{JournalError, Result};
pub use identity::{IdentityError, IdentityStrategy, ResolvedIdentity};
pub use journal::{Export, Journal};
pub use models::{UserDocument, ValidationError};
pub use store::{DocumentStore, StoreError, UserId};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
