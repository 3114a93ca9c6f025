//! Object-store client built on Apache OpenDAL.
//!
//! Vendor-agnostic storage for profile photos with support for:
//! - S3-compatible: Cloudflare R2, Supabase Storage, AWS S3, DigitalOcean Spaces
//! - Azure Blob Storage
//! - Local filesystem (development only)
//! - In-memory (tests only)

mod config;
mod error;
mod service;

pub use config::StorageConfig;
pub use error::StorageError;
pub use service::{ObjectStore, photo_key};
