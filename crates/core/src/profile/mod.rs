//! Profile-photo management.
//!
//! Owns the attach/replace/remove protocol for the single photo object
//! referenced by an account record, including caller authorization and
//! reconciliation between the record's `photo_key` and the object store.

mod error;
mod service;

pub use error::ProfileError;
pub use service::{Caller, PhotoUpload, ProfileService};
