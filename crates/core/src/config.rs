//! Provisioning configuration
//!
//! TOML-backed settings describing what to install and where. The file
//! carries the profile, the requested components, the supported platform
//! range, and the working/output directories.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ProvisionError, Result};
use crate::profile::Profile;

/// Command-line tools release installed when the config does not name one
pub const DEFAULT_TOOLS_RELEASE: &str = "11076708";

/// Supported Android platform range. Carried as data so the bounds are a
/// versioned input to validation rather than a compiled-in fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformRange {
    /// Lowest supported API level
    pub min: u32,
    /// Highest supported API level
    pub max: u32,
}

impl Default for PlatformRange {
    fn default() -> Self {
        Self { min: 7, max: 35 }
    }
}

impl PlatformRange {
    /// Check whether an API level falls inside the range
    pub fn contains(&self, version: u32) -> bool {
        version >= self.min && version <= self.max
    }
}

/// Components requested from the vendor installer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisionRequest {
    /// Android platform API level to install
    pub platform_version: u32,
    /// build-tools revision string
    pub build_tools_revision: String,
    /// Command-line tools release the vendor archive is keyed by
    pub tools_release: String,
    /// Optional native toolkit version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ndk_version: Option<String>,
}

impl Default for ProvisionRequest {
    fn default() -> Self {
        Self {
            platform_version: 34,
            build_tools_revision: "33.0.2".to_string(),
            tools_release: DEFAULT_TOOLS_RELEASE.to_string(),
            ndk_version: None,
        }
    }
}

/// Working and output directories for a provisioning run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirSettings {
    /// Staging directory the archive is extracted into and components are
    /// installed under
    pub work_dir: PathBuf,
    /// Final output package directory
    pub package_dir: PathBuf,
}

impl Default for DirSettings {
    fn default() -> Self {
        let base = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("droidpack");

        Self {
            work_dir: base.join("staging"),
            package_dir: base.join("package"),
        }
    }
}

/// Top-level provisioning configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProvisionConfig {
    /// Host/build profile
    #[serde(default)]
    pub profile: Profile,
    /// Requested components
    #[serde(default)]
    pub request: ProvisionRequest,
    /// Supported platform range for this revision
    #[serde(default)]
    pub platforms: PlatformRange,
    /// Directories
    #[serde(default)]
    pub dirs: DirSettings,
}

impl ProvisionConfig {
    /// Get the configuration directory path
    pub fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "droidpack", "droidpack")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Get the configuration file path
    pub fn config_file() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("droidpack.toml"))
    }

    /// Load configuration from an explicit path
    pub async fn load_from(path: &Path) -> Result<Self> {
        debug!("Loading config from {:?}", path);
        let contents = tokio::fs::read_to_string(path).await?;
        let config: ProvisionConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from the default location, creating the default
    /// file when it does not exist yet
    pub async fn load() -> Result<Self> {
        let config_file = Self::config_file()
            .ok_or_else(|| ProvisionError::Config("Cannot determine config path".into()))?;

        if config_file.exists() {
            Self::load_from(&config_file).await
        } else {
            info!("Config file not found, using defaults");
            let config = ProvisionConfig::default();
            config.save().await?;
            Ok(config)
        }
    }

    /// Save configuration to an explicit path
    pub async fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let contents = toml::to_string_pretty(self)?;
        tokio::fs::write(path, contents).await?;

        debug!("Config saved to {:?}", path);
        Ok(())
    }

    /// Save configuration to the default location
    pub async fn save(&self) -> Result<()> {
        let config_file = Self::config_file()
            .ok_or_else(|| ProvisionError::Config("Cannot determine config path".into()))?;
        self.save_to(&config_file).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{Arch, Os};

    #[test]
    fn test_default_config() {
        let config = ProvisionConfig::default();
        assert_eq!(config.request.platform_version, 34);
        assert_eq!(config.request.tools_release, DEFAULT_TOOLS_RELEASE);
        assert!(config.request.ndk_version.is_none());
        assert_eq!(config.platforms, PlatformRange { min: 7, max: 35 });
        assert!(config.profile.host.is_some());
    }

    #[test]
    fn test_platform_range_bounds() {
        let range = PlatformRange { min: 8, max: 33 };
        assert!(range.contains(8));
        assert!(range.contains(33));
        assert!(!range.contains(7));
        assert!(!range.contains(34));
    }

    #[test]
    fn test_config_round_trip() {
        let mut config = ProvisionConfig::default();
        config.profile = Profile::host_only(Os::Macos, Arch::X86_64);
        config.request.platform_version = 31;
        config.request.ndk_version = Some("26.1.10909125".to_string());

        let rendered = toml::to_string_pretty(&config).unwrap();
        let parsed: ProvisionConfig = toml::from_str(&rendered).unwrap();

        assert_eq!(parsed.request.platform_version, 31);
        assert_eq!(parsed.request.ndk_version.as_deref(), Some("26.1.10909125"));
        assert_eq!(parsed.profile.host.unwrap().os, Os::Macos);
    }

    #[test]
    fn test_parse_minimal_file() {
        let config: ProvisionConfig = toml::from_str(
            r#"
            [profile.host]
            os = "linux"
            arch = "x86_64"

            [request]
            platform_version = 34
            build_tools_revision = "33.0.2"
            tools_release = "11076708"
            "#,
        )
        .unwrap();

        assert_eq!(config.profile.host.unwrap().os, Os::Linux);
        assert_eq!(config.request.build_tools_revision, "33.0.2");
        // unspecified sections fall back to defaults
        assert_eq!(config.platforms, PlatformRange::default());
    }

    #[tokio::test]
    async fn test_save_and_load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("droidpack.toml");

        let config = ProvisionConfig::default();
        config.save_to(&path).await.unwrap();

        let loaded = ProvisionConfig::load_from(&path).await.unwrap();
        assert_eq!(loaded.request.platform_version, config.request.platform_version);
    }
}
