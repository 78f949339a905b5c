//! Data models
//!
//! Shared between bomo-server and its clients (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` snowflakes (see [`crate::util::snowflake_id`]).

pub mod note;
pub mod serde_helpers;
pub mod tag;

// Re-exports
pub use note::*;
pub use tag::*;
