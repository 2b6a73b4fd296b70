//! Error types for droidpack
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

use crate::profile::{Arch, Os, ProfileContext};

/// Main error type for droidpack operations
#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Profile is missing os/arch settings for the {context} context")]
    MissingSetting { context: ProfileContext },

    #[error("Unsupported os {0}. This package currently only supports Linux/Macos/Windows")]
    UnsupportedOs(Os),

    #[error("Unsupported architecture {0}. This package currently only supports x86_64")]
    UnsupportedArch(Arch),

    #[error("Unsupported Android platform version {version} (supported [{min} ... {max}])")]
    PlatformVersionOutOfRange { version: u32, min: u32, max: u32 },

    #[error("No archive source for command-line tools {release} on {os}")]
    UnknownSource { release: String, os: Os },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Download error: {0}")]
    Download(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Process error: {0}")]
    Process(String),

    #[error("Packaging error: {0}")]
    Package(String),
}

/// Result type alias for droidpack operations
pub type Result<T> = std::result::Result<T, ProvisionError>;

impl ProvisionError {
    /// Check whether the error happened before any network or process activity
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ProvisionError::Config(_)
                | ProvisionError::MissingSetting { .. }
                | ProvisionError::UnsupportedOs(_)
                | ProvisionError::UnsupportedArch(_)
                | ProvisionError::PlatformVersionOutOfRange { .. }
        )
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            ProvisionError::Io(e) => format!("File operation failed: {}", e),
            ProvisionError::Config(msg) => format!("Configuration error: {}", msg),
            ProvisionError::Network(msg) => {
                format!("Network error: {}. Please check your connection.", msg)
            }
            ProvisionError::Download(msg) => format!("Download failed: {}", msg),
            ProvisionError::Process(msg) => format!("sdkmanager invocation failed: {}", msg),
            _ => self.to_string(),
        }
    }
}
