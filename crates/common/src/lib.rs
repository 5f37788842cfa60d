//! Common utilities and shared types for netabase.
//!
//! This crate provides foundational components used across all netabase
//! crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **ID Generation**: ULID-based unique identifiers via [`IdGenerator`]
//! - **Slugs**: URL-safe identifier derivation via [`slugify`]
//! - **Detail Cache**: Redis-backed caching for detail payloads
//! - **Token Blacklist**: Redis-backed refresh token revocation
//!
//! # Example
//!
//! ```no_run
//! use netabase_common::{Config, IdGenerator, AppResult};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let id_gen = IdGenerator::new();
//!     let id = id_gen.generate();
//!     println!("Generated ID: {}", id);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod detail_cache;
pub mod error;
pub mod id;
pub mod slug;
pub mod token_blacklist;

pub use config::Config;
pub use detail_cache::{DetailCache, DetailCacheError};
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
pub use slug::slugify;
pub use token_blacklist::TokenBlacklist;
