//! droidpack - Android SDK provisioning and repackaging
//!
//! Downloads the Android command-line tools for the host OS, drives the
//! bundled `sdkmanager` to accept licenses and install the requested
//! components, and repackages the result for downstream build pipelines.
//!
//! ## Architecture
//!
//! droidpack is organized into specialized crates:
//!
//! - `droidpack-core`: configuration, profile model, validation, errors
//! - `droidpack-provisioner`: archive sources, fetcher, sdkmanager
//!   wrapper, packager, publisher, and the linear pipeline

pub mod commands;

// Re-export main components for library usage
pub use droidpack_core as core;
pub use droidpack_provisioner as provisioner;

/// Prelude module for convenient imports
pub mod prelude {
    pub use droidpack_core::{ProvisionConfig, ProvisionError, Result};
    pub use droidpack_provisioner::{ProvisionPipeline, PublishedInfo, Stage};
}
