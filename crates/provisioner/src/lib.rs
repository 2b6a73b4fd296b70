//! Android SDK provisioning
//!
//! Turns a validated provisioning request into a packaged SDK tree:
//! - fetch the vendor command-line tools archive for the host OS
//! - drive the bundled `sdkmanager` to accept licenses and install
//!   the requested components
//! - repackage the installed trees and publish them to consumers

pub mod fetcher;
pub mod packager;
pub mod pipeline;
pub mod publisher;
pub mod sdkmanager;
pub mod sources;

pub use fetcher::{ArchiveFetcher, FetchConfig, ProgressCallback};
pub use packager::Packager;
pub use pipeline::{ProvisionPipeline, Stage};
pub use publisher::{InfoPublisher, PublishedInfo};
pub use sdkmanager::{InstalledComponent, SdkComponent, SdkManagerClient};
pub use sources::{archive_source, ArchiveSource};

/// Top-level directories the packager copies out of the staged SDK
pub const PACKAGE_DIRS: &[&str] = &["build-tools", "licenses", "platforms", "platform-tools"];

/// Optional native toolkit directory, packaged only when requested
pub const NDK_DIR: &str = "ndk";
