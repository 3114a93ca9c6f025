//! Core business logic for Atrium.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and the photo-replace protocol live here.
//!
//! # Modules
//!
//! - `account` - Account records, validation, and the store service
//! - `profile` - Profile-photo attach/replace/remove protocol
//! - `storage` - Object-store client over Apache OpenDAL
//! - `auth` - Password hashing for the account secret field

pub mod account;
pub mod auth;
pub mod profile;
pub mod storage;
