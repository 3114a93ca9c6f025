//! Shared types, authentication, and configuration for Atrium.
//!
//! This crate provides common types used across all other crates:
//! - JWT claims and token service
//! - The account role enum
//! - Configuration management

pub mod auth;
pub mod config;
pub mod jwt;

pub use auth::{Claims, Role};
pub use config::AppConfig;
pub use jwt::{JwtConfig, JwtError, JwtService};
