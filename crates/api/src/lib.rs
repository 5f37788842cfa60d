//! HTTP API layer for netabase.
//!
//! This crate provides the REST API:
//!
//! - **Endpoints**: parties, politicians, ratings, auth, news
//! - **Extractors**: authentication
//! - **Middleware**: bearer token resolution
//! - **Response**: the paginated `{count, next, previous, results}` envelope
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
