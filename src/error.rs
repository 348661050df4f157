//! Error types for weather-records
//!
//! This module defines the error hierarchy used throughout the service.
//! Each layer has its own `thiserror` enum; everything rolls up into
//! [`AppError`], which [`http_mapper`] converts to an HTTP response at the
//! boundary.

pub mod http_mapper;

use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("{0}")]
    Request(#[from] RequestError),

    #[error("{0}")]
    Rejected(#[from] GateRejection),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(String),

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Missing required configuration: {field}")]
    Missing { field: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Document store errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Collection '{collection}' has no field '{field}'")]
    UnknownField {
        collection: &'static str,
        field: String,
    },

    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Field '{field}' cannot be modified")]
    ImmutableField { field: &'static str },

    #[error("Collection '{collection}' is registered with a different entity type")]
    CollectionType { collection: &'static str },

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Credential and role errors
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Unknown role '{0}'")]
    InvalidRole(String),

    #[error("Secret hashing failed: {0}")]
    Hash(String),
}

/// Early exits of the authorization gate
///
/// None of these touch the activity timestamp.
#[derive(Error, Debug)]
pub enum GateRejection {
    #[error("No API key provided.")]
    NoKey,

    #[error("Operation requires unknown role '{0}'")]
    InvalidRole(String),

    #[error("User key was invalid or did not have required permissions.")]
    Unauthenticated,

    #[error("Credential lookup failed: {0}")]
    Store(#[from] StoreError),
}

/// Caller input rejected before or instead of a store mutation
#[derive(Error, Debug)]
pub enum RequestError {
    #[error("Unable to parse given id: {0}")]
    InvalidIdentity(String),

    #[error("No fields to update were provided")]
    EmptyPatch,

    #[error("No filters were provided")]
    EmptyFilter,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("An account named '{0}' already exists")]
    DuplicateAccount(String),

    #[error("{0}")]
    NotFound(String),
}

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, AppError>;
