//! droidpack - Android SDK provisioning and repackaging
//!
//! Entry point: sets up logging, reads the provisioning configuration,
//! and runs the pipeline.

use std::path::PathBuf;

use anyhow::Result;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use droidpack::commands::ProvisionCommand;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Main entry point
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    info!("droidpack v{} starting...", VERSION);

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    if let Some(path) = &config_path {
        info!("Using configuration from {:?}", path);
    }

    let command = ProvisionCommand {
        config_path,
        java_home: std::env::var_os("JAVA_HOME").map(PathBuf::from),
    };
    command.execute().await
}
