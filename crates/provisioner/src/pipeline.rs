//! Provisioning pipeline
//!
//! Linear run through the provisioning stages. Any failure is terminal
//! for the run; nothing is retried and no partial package is published.

use std::path::PathBuf;

use droidpack_core::{validate_request, ProvisionConfig, Result};
use tracing::{debug, info, warn};

use crate::fetcher::{ArchiveFetcher, FetchConfig, ProgressCallback};
use crate::packager::Packager;
use crate::publisher::{InfoPublisher, PublishedInfo};
use crate::sdkmanager::{SdkComponent, SdkManagerClient};
use crate::sources::archive_source;

/// Stages of a provisioning run, in order. There are no back-edges; a
/// failed run stops at whatever stage it reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Unvalidated,
    Validated,
    Fetched,
    LicensesAccepted,
    ComponentsInstalled,
    Packaged,
    Published,
}

/// Drives one provisioning run from configuration to published package
pub struct ProvisionPipeline {
    config: ProvisionConfig,
    stage: Stage,
    progress: Option<ProgressCallback>,
    java_home: Option<PathBuf>,
}

impl ProvisionPipeline {
    /// Create a pipeline for a configuration
    pub fn new(config: ProvisionConfig) -> Self {
        Self {
            config,
            stage: Stage::Unvalidated,
            progress: None,
            java_home: None,
        }
    }

    /// Attach a download progress callback
    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Set the JAVA_HOME handed to installer invocations
    pub fn with_java_home(mut self, java_home: PathBuf) -> Self {
        self.java_home = Some(java_home);
        self
    }

    /// Get the stage the run last reached
    pub fn stage(&self) -> Stage {
        self.stage
    }

    fn advance(&mut self, stage: Stage) {
        debug!("Stage transition: {:?} -> {:?}", self.stage, stage);
        self.stage = stage;
    }

    /// Run the full pipeline and return what was published
    pub async fn run(&mut self) -> Result<PublishedInfo> {
        let settings = self.config.profile.resolve()?;
        let request = self.config.request.clone();

        validate_request(&settings, &request, &self.config.platforms)?;
        self.advance(Stage::Validated);

        let source = archive_source(&request.tools_release, settings.os)?;
        let fetcher = ArchiveFetcher::new(FetchConfig {
            work_dir: self.config.dirs.work_dir.clone(),
            ..FetchConfig::default()
        })?;
        let sdk_root = fetcher.fetch(source, self.progress.take()).await?;
        self.advance(Stage::Fetched);

        let mut sdkmanager = SdkManagerClient::new(sdk_root.clone())?;
        if let Some(java_home) = &self.java_home {
            sdkmanager.set_java_home(java_home.clone());
        }

        sdkmanager.accept_licenses().await?;
        self.advance(Stage::LicensesAccepted);

        let mut components = vec![
            SdkComponent::Platform(request.platform_version),
            SdkComponent::BuildTools(request.build_tools_revision.clone()),
            SdkComponent::PlatformTools,
        ];
        if let Some(ndk_version) = &request.ndk_version {
            components.push(SdkComponent::Ndk(ndk_version.clone()));
        }
        sdkmanager.install_all(&components).await?;

        match sdkmanager.list_installed().await {
            Ok(installed) => {
                for component in &installed {
                    debug!("Installed: {} {}", component.package, component.version);
                }
                info!("{} SDK packages installed", installed.len());
            }
            Err(e) => warn!("Could not list installed packages: {}", e),
        }
        self.advance(Stage::ComponentsInstalled);

        let packager = Packager::new(sdk_root, self.config.dirs.package_dir.clone());
        packager.package(request.ndk_version.is_some()).await?;
        self.advance(Stage::Packaged);

        let package_dir = tokio::fs::canonicalize(&self.config.dirs.package_dir).await?;
        let publisher = InfoPublisher::new(package_dir, request.build_tools_revision.clone());
        let published = publisher.publish().await?;
        self.advance(Stage::Published);

        info!("Provisioned SDK package at {:?}", published.sdk_root);
        Ok(published)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use droidpack_core::{Arch, Os, Profile, ProvisionError};

    fn config_in(dir: &std::path::Path) -> ProvisionConfig {
        let mut config = ProvisionConfig::default();
        config.profile = Profile::host_only(Os::Linux, Arch::X86_64);
        config.dirs.work_dir = dir.join("staging");
        config.dirs.package_dir = dir.join("package");
        config
    }

    #[tokio::test]
    async fn test_out_of_range_platform_stops_before_any_activity() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path());
        config.request.platform_version = 5;

        let mut pipeline = ProvisionPipeline::new(config);
        let err = pipeline.run().await.unwrap_err();

        assert!(matches!(
            err,
            ProvisionError::PlatformVersionOutOfRange { version: 5, .. }
        ));
        assert_eq!(pipeline.stage(), Stage::Unvalidated);
        // nothing was fetched or staged
        assert!(!dir.path().join("staging").exists());
        assert!(!dir.path().join("package").exists());
    }

    #[tokio::test]
    async fn test_non_host_os_stops_before_any_activity() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path());
        config.profile = Profile::host_only(Os::Android, Arch::X86_64);

        let mut pipeline = ProvisionPipeline::new(config);
        let err = pipeline.run().await.unwrap_err();

        assert!(matches!(err, ProvisionError::UnsupportedOs(Os::Android)));
        assert!(!dir.path().join("staging").exists());
    }

    #[tokio::test]
    async fn test_missing_build_context_stops_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path());
        config.profile.cross_building = true;
        config.profile.build = None;

        let mut pipeline = ProvisionPipeline::new(config);
        let err = pipeline.run().await.unwrap_err();

        assert!(matches!(err, ProvisionError::MissingSetting { .. }));
        assert_eq!(pipeline.stage(), Stage::Unvalidated);
    }

    #[tokio::test]
    async fn test_unknown_tools_release_stops_after_validation() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path());
        config.request.tools_release = "99999999".to_string();

        let mut pipeline = ProvisionPipeline::new(config);
        let err = pipeline.run().await.unwrap_err();

        assert!(matches!(err, ProvisionError::UnknownSource { .. }));
        assert_eq!(pipeline.stage(), Stage::Validated);
        assert!(!dir.path().join("staging").exists());
    }
}
