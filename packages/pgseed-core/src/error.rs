//! Seeding error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading configuration or rewriting schema files.
///
/// External tool failures are deliberately absent here: pipeline steps
/// report those through [`RunOutcome`](crate::command::RunOutcome) and
/// logging, and the pipeline keeps going either way.
#[derive(Error, Debug)]
pub enum SeedError {
    /// Required environment variable is not set
    #[error("Environment variable '{name}' is not set")]
    MissingEnv { name: &'static str },

    /// File could not be read or written
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid JSON
    #[error("Failed to parse '{path}': {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Configuration violates an invariant
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}
