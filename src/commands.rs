//! CLI commands for droidpack
//!
//! Command-line interface functionality for automation and scripting.

use std::path::PathBuf;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use droidpack_core::ProvisionConfig;
use droidpack_provisioner::ProvisionPipeline;

/// Provision command options
pub struct ProvisionCommand {
    /// Explicit configuration file, or the default location when absent
    pub config_path: Option<PathBuf>,
    /// JAVA_HOME handed to installer invocations
    pub java_home: Option<PathBuf>,
}

impl ProvisionCommand {
    /// Execute the provisioning run
    pub async fn execute(&self) -> Result<()> {
        let config = match &self.config_path {
            Some(path) => ProvisionConfig::load_from(path).await?,
            None => ProvisionConfig::load().await?,
        };

        info!(
            "Provisioning platform {} / build-tools {} into {:?}",
            config.request.platform_version,
            config.request.build_tools_revision,
            config.dirs.package_dir
        );

        let bar = ProgressBar::new(0);
        bar.set_style(ProgressStyle::with_template(
            "{bytes}/{total_bytes} {wide_bar} {eta}",
        )?);

        let progress_bar = bar.clone();
        let mut pipeline =
            ProvisionPipeline::new(config).with_progress(Box::new(move |downloaded, total| {
                if progress_bar.length() != Some(total) {
                    progress_bar.set_length(total);
                }
                progress_bar.set_position(downloaded);
            }));

        if let Some(java_home) = &self.java_home {
            pipeline = pipeline.with_java_home(java_home.clone());
        }

        let published = pipeline.run().await;
        bar.finish_and_clear();
        let published = published?;

        info!("SDK package ready at {:?}", published.sdk_root);
        for (key, value) in &published.env {
            info!("  {}={}", key, value);
        }
        info!("Toolchain snippet: {:?}", published.user_toolchain);
        Ok(())
    }
}
