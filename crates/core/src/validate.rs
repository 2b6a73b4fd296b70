//! Option validation
//!
//! Fail-fast checks run before any network or subprocess activity. Pure
//! checks over the resolved settings; no side effects.

use tracing::debug;

use crate::config::{PlatformRange, ProvisionRequest};
use crate::error::{ProvisionError, Result};
use crate::profile::{Arch, Os, TargetSettings};

/// Validate the resolved settings and requested components against the
/// supported platform range
pub fn validate_request(
    settings: &TargetSettings,
    request: &ProvisionRequest,
    platforms: &PlatformRange,
) -> Result<()> {
    if settings.arch != Arch::X86_64 {
        return Err(ProvisionError::UnsupportedArch(settings.arch));
    }

    if !Os::supported_hosts().contains(&settings.os) {
        return Err(ProvisionError::UnsupportedOs(settings.os));
    }

    if !platforms.contains(request.platform_version) {
        return Err(ProvisionError::PlatformVersionOutOfRange {
            version: request.platform_version,
            min: platforms.min,
            max: platforms.max,
        });
    }

    debug!(
        "Validated request: platform {} build-tools {} on {}/{}",
        request.platform_version, request.build_tools_revision, settings.os, settings.arch
    );
    Ok(())
}
