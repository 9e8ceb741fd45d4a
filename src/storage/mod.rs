//! Storage module
//!
//! Thin key/value view of an object store bucket: list, get, put, delete.
//!
//! # Overview
//!
//! - Backends: S3, GCS, Azure, local filesystem, in-memory
//! - Optional token-bucket rate limiting of storage requests
//! - Object-created notifications for a watched zone

mod rate_limit;
mod store;

pub use rate_limit::RateLimiter;
pub use store::ObjectStorage;
