//! Info publisher
//!
//! Surfaces the packaged SDK to downstream consumers: environment
//! variables under both conventional SDK root names, a one-line CMake
//! cache snippet, and a JSON manifest carrying the toolchain
//! auto-include pointer.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use droidpack_core::ProvisionError;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Generated CMake snippet file name
pub const TOOLCHAIN_SNIPPET_FILE: &str = "android_sdk_path.cmake";

/// Generated manifest file name
pub const MANIFEST_FILE: &str = "provision-manifest.json";

/// Publishing errors
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<PublishError> for ProvisionError {
    fn from(err: PublishError) -> Self {
        match err {
            PublishError::Io(e) => ProvisionError::Io(e),
            PublishError::Json(e) => ProvisionError::Json(e),
        }
    }
}

/// What a completed run exposes to consumers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishedInfo {
    /// Absolute path of the output package
    pub sdk_root: PathBuf,
    /// Environment variables downstream builds should set
    pub env: HashMap<String, String>,
    /// Toolchain snippet consumers should auto-include
    pub user_toolchain: PathBuf,
}

/// Publishes environment variables and generated files for a package
pub struct InfoPublisher {
    package_dir: PathBuf,
    build_tools_revision: String,
}

impl InfoPublisher {
    /// Create a publisher for a packaged SDK root
    pub fn new(package_dir: PathBuf, build_tools_revision: impl Into<String>) -> Self {
        Self {
            package_dir,
            build_tools_revision: build_tools_revision.into(),
        }
    }

    /// Environment variables downstream builds consume. The SDK root is
    /// published under both conventional names.
    pub fn env_vars(&self) -> HashMap<String, String> {
        let root = self.package_dir.to_string_lossy().to_string();

        let mut vars = HashMap::new();
        vars.insert("SDK_ROOT".to_string(), root.clone());
        vars.insert("ANDROID_SDK_ROOT".to_string(), root);
        vars.insert(
            "ANDROID_BUILD_TOOLS_REVISION".to_string(),
            self.build_tools_revision.clone(),
        );
        vars
    }

    /// Write the CMake snippet: a single cache-variable assignment holding
    /// the absolute package path
    pub async fn write_toolchain_snippet(&self) -> Result<PathBuf, PublishError> {
        let path = self.package_dir.join(TOOLCHAIN_SNIPPET_FILE);
        let content = format!(
            "set(ANDROID_SDK_ROOT \"{}\" CACHE PATH \"Android SDK root\")\n",
            self.package_dir.display()
        );

        tokio::fs::write(&path, content).await?;
        info!("Wrote toolchain snippet to {:?}", path);
        Ok(path)
    }

    /// Write the machine-readable manifest with the auto-include pointer
    pub async fn write_manifest(&self, published: &PublishedInfo) -> Result<PathBuf, PublishError> {
        let path = self.package_dir.join(MANIFEST_FILE);
        let contents = serde_json::to_string_pretty(published)?;

        tokio::fs::write(&path, contents).await?;
        info!("Wrote provision manifest to {:?}", path);
        Ok(path)
    }

    /// Shell export rendering for terminal display
    pub fn shell_exports(&self) -> String {
        let mut exports = String::new();

        for (key, value) in self.env_vars() {
            if cfg!(windows) {
                exports.push_str(&format!("set {}={}\n", key, value));
            } else {
                exports.push_str(&format!("export {}=\"{}\"\n", key, value));
            }
        }

        exports
    }

    /// Publish everything for the package. Returns what downstream
    /// consumers should see.
    pub async fn publish(&self) -> Result<PublishedInfo, PublishError> {
        let user_toolchain = self.write_toolchain_snippet().await?;

        let published = PublishedInfo {
            sdk_root: self.package_dir.clone(),
            env: self.env_vars(),
            user_toolchain,
        };
        self.write_manifest(&published).await?;

        info!(
            "Published SDK_ROOT, ANDROID_SDK_ROOT environment variables: {}",
            self.package_dir.display()
        );
        Ok(published)
    }

    /// Get the package directory
    pub fn package_dir(&self) -> &Path {
        &self.package_dir
    }
}
