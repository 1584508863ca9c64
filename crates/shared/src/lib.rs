//! Shared types, errors, and configuration for Expenza.
//!
//! This crate provides common types used across all other crates:
//! - Application-wide error types
//! - Configuration management
//! - JWT claims and token issuance/validation
//! - Auth request/response payloads

pub mod auth;
pub mod config;
pub mod error;
pub mod jwt;

pub use auth::Claims;
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use jwt::{JwtError, JwtService};
