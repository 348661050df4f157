//! Weather Records Service
//!
//! A role-gated record service for weather telemetry readings and user
//! accounts.
//!
//! ## Features
//!
//! - **Sparse filters** composed into one selection predicate, including an
//!   extremal "highest temperature" rule resolved by a pre-scan
//! - **Sparse patches** composed into field-level mutations from a field
//!   table generated by `#[derive(Document)]` and `#[derive(SparsePatch)]`
//! - **Authorization gate** in front of every operation, refreshing the
//!   presented key's last-access time on success
//! - **Flexible configuration** via TOML files and environment variables
//!
//! ## Role Model
//!
//! ```text
//! Admin (0) ≥ Teacher (1) ≥ Student (2)
//! ```
//!
//! A lower ordinal is more privileged; an account satisfies a requirement when
//! its ordinal is less than or equal to the required one.
//!
//! ## Example Configuration
//!
//! ```toml
//! [server]
//! port = 5080
//!
//! [auth]
//! admin_username = "root"
//! admin_password = "change-me"   # or WEATHER_RECORDS__AUTH__ADMIN_PASSWORD
//!
//! [accounts]
//! inactivity_days = 30
//! ```

pub mod auth;
pub mod compose;
pub mod config;
pub mod error;
pub mod model;
pub mod repository;
pub mod server;
pub mod store;

// Re-export main types
pub use config::{AppConfig, load_config};
pub use error::{AppError, Result};
pub use server::{AppState, router};
