//! Custom error types for secret profile operations.
//!
//! This module provides fine-grained error handling for credential store
//! access, profile bookkeeping, and the editor round trip.

use thiserror::Error;

/// Main error type for profile operations.
#[derive(Error, Debug)]
pub enum SecretsError {
    /// Referenced profile is not in the metadata list.
    #[error("No such profile {0}")]
    NoSuchProfile(String),

    /// Attempted to delete the profile that is currently the default.
    #[error("Cannot delete current profile")]
    DeleteCurrentProfile,

    /// Attempted to copy over the profile that is currently the default.
    #[error("Cannot copy on top of current profile {0}")]
    CopyOntoCurrentProfile(String),

    /// A brand-new profile needs seeding but no template is configured.
    #[error("DEVENV_SECRETS_TEMPLATE is not set")]
    TemplateUnset,

    /// The template path is set but the file could not be read.
    #[error("Failed to read template {path}: {source}")]
    TemplateRead {
        path: String,
        source: std::io::Error,
    },

    /// OS keychain failure.
    #[error("Credential store error: {0}")]
    Store(#[from] keyring::Error),

    /// The `__meta__` entry exists but is not valid metadata JSON.
    #[error("Profile metadata is corrupt: {0}")]
    CorruptMeta(#[source] serde_json::Error),

    /// JSON serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The configured editor could not be started.
    #[error("Failed to launch editor {editor}: {source}")]
    EditorLaunch {
        editor: String,
        source: std::io::Error,
    },

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for profile operations.
pub type Result<T> = std::result::Result<T, SecretsError>;
