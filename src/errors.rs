use std::path::PathBuf;
use thiserror::Error;

use crate::backend::BackendError;

/// All errors that can occur in vault-util.
#[derive(Debug, Error)]
pub enum VaultUtilError {
    // --- Addressing errors ---
    #[error("Malformed secret key '{0}' — expected <mount>/<path>")]
    MalformedKey(String),

    #[error("Secret mount '{0}' does not exist")]
    MountNotFound(String),

    #[error("Malformed data for secret mount '{mount}': {reason}")]
    MountDataMalformed { mount: String, reason: String },

    #[error("Listing '{path}' failed: {source}")]
    Listing {
        path: String,
        #[source]
        source: BackendError,
    },

    #[error("Secret engine '{0}' does not support reading or writing secrets")]
    UnsupportedEngine(String),

    // --- Backend errors ---
    #[error("Vault request failed: {0}")]
    Backend(#[from] BackendError),

    // --- Connection errors ---
    #[error("Invalid vault connection: {0}")]
    InvalidConnection(String),

    #[error("Vault '{0}' is not configured in the settings file")]
    VaultNotConfigured(String),

    #[error("Settings file not found at {0}")]
    SettingsNotFound(PathBuf),

    // --- Config errors ---
    #[error("Settings file error: {0}")]
    Settings(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    Serialization(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),
}

impl VaultUtilError {
    /// Process exit code reported for this error.
    ///
    /// Local settings problems exit with 100, a bad ad-hoc connection with
    /// 150, a saved vault that cannot be looked up with 200, and anything
    /// that went wrong talking to the vault with 250.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Settings(_) | Self::Io(_) | Self::Serialization(_) => 100,
            Self::InvalidConnection(_) => 150,
            Self::VaultNotConfigured(_) | Self::SettingsNotFound(_) => 200,
            Self::MalformedKey(_)
            | Self::MountNotFound(_)
            | Self::MountDataMalformed { .. }
            | Self::Listing { .. }
            | Self::UnsupportedEngine(_)
            | Self::Backend(_) => 250,
            Self::CommandFailed(_) => 1,
        }
    }
}

/// Convenience type alias for vault-util results.
pub type Result<T> = std::result::Result<T, VaultUtilError>;
