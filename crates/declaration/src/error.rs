//! Error types for declaring, loading and describing options.
//!
//! Responsibilities:
//! - Define error variants for contract violations (duplicate keys, sealed registry).
//! - Aggregate payload shape problems into a single error.
//! - Convert codec errors from `serde_json`, `serde_yaml` and `toml`.
//!
//! Does NOT handle:
//! - Validation issues of a live configuration; those are returned as an
//!   `ErrorMap` unless strict mode escalates them to `InvalidConfiguration`.
//!
//! Invariants:
//! - Every contract violation names the key or format involved.

use thiserror::Error;

use crate::key::{Key, KeyError};

/// Errors that can occur while building or exporting a declaration.
#[derive(Error, Debug)]
pub enum DeclarationError {
    #[error(transparent)]
    InvalidKey(#[from] KeyError),

    #[error("{0} already declared")]
    AlreadyDeclared(Key),

    #[error("Sealed declaration cannot be updated: {action} '{target}'")]
    Sealed { action: &'static str, target: String },

    #[error("Unknown {kind} format '{name}'. Valid options: {}", available.join(", "))]
    UnknownFormat {
        kind: &'static str,
        name: String,
        available: Vec<String>,
    },

    #[error("Loader '{format}' cannot handle this input")]
    UnexpectedInput { format: String },

    #[error("Invalid declaration payload:\n{}", errors.join("\n"))]
    InvalidPayload { errors: Vec<String> },

    #[error("Unsupported declaration schema version: {0}")]
    UnsupportedVersion(serde_json::Value),

    #[error("Failed to parse core declaration: {0}")]
    CoreSchema(#[source] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::ser::Error),

    #[error("Invalid configuration:\n{report}")]
    InvalidConfiguration { report: String },
}
