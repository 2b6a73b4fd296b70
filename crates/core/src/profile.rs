//! Provisioning profile model
//!
//! Settings for the host and build contexts are resolved up front into an
//! explicit struct. The invoking build setup hands the tool either a
//! single profile (host only) or a cross-compilation profile carrying
//! both contexts; [`Profile::resolve`] selects which side to read and
//! fails with an error naming the context when it is absent.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ProvisionError, Result};

/// Operating systems a profile may name. Validation narrows this to the
/// hosts the vendor archive exists for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Os {
    Windows,
    Linux,
    Macos,
    Android,
    Ios,
    FreeBsd,
}

impl Os {
    /// OS key used in vendor archive file names
    pub fn archive_key(&self) -> Option<&'static str> {
        match self {
            Os::Windows => Some("win"),
            Os::Linux => Some("linux"),
            Os::Macos => Some("mac"),
            _ => None,
        }
    }

    /// Hosts accepted by the option validator
    pub fn supported_hosts() -> &'static [Os] {
        &[Os::Windows, Os::Linux, Os::Macos]
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Os::Windows => "Windows",
            Os::Linux => "Linux",
            Os::Macos => "Macos",
            Os::Android => "Android",
            Os::Ios => "iOS",
            Os::FreeBsd => "FreeBSD",
        };
        write!(f, "{}", name)
    }
}

/// CPU architectures a profile may name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Arch {
    X86_64,
    X86,
    Armv8,
    Armv7,
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Arch::X86_64 => "x86_64",
            Arch::X86 => "x86",
            Arch::Armv8 => "armv8",
            Arch::Armv7 => "armv7",
        };
        write!(f, "{}", name)
    }
}

/// Resolved os/arch pair for one profile context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSettings {
    pub os: Os,
    pub arch: Arch,
}

/// Which side of a cross-compilation profile to read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileContext {
    Host,
    Build,
}

impl fmt::Display for ProfileContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileContext::Host => write!(f, "host"),
            ProfileContext::Build => write!(f, "build"),
        }
    }
}

/// Dual-context profile supplied by the invoking build setup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// Whether this is a cross-compilation profile reading the build context
    #[serde(default)]
    pub cross_building: bool,
    /// Settings for the machine running the provisioning
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<TargetSettings>,
    /// Settings for the build context of a cross-compilation profile
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build: Option<TargetSettings>,
}

impl Default for Profile {
    fn default() -> Self {
        let os = if cfg!(windows) {
            Os::Windows
        } else if cfg!(target_os = "macos") {
            Os::Macos
        } else {
            Os::Linux
        };

        Self {
            host: Some(TargetSettings {
                os,
                arch: Arch::X86_64,
            }),
            build: None,
            cross_building: false,
        }
    }
}

impl Profile {
    /// Create a single profile carrying only host settings
    pub fn host_only(os: Os, arch: Arch) -> Self {
        Self {
            host: Some(TargetSettings { os, arch }),
            build: None,
            cross_building: false,
        }
    }

    /// Get the settings for one context, failing with an error that names
    /// the context when it is absent
    pub fn settings(&self, context: ProfileContext) -> Result<TargetSettings> {
        let settings = match context {
            ProfileContext::Host => self.host,
            ProfileContext::Build => self.build,
        };
        settings.ok_or(ProvisionError::MissingSetting { context })
    }

    /// Resolve the settings the provisioner should use: the build context
    /// for a cross-compilation profile, the host context otherwise
    pub fn resolve(&self) -> Result<TargetSettings> {
        let context = if self.cross_building {
            ProfileContext::Build
        } else {
            ProfileContext::Host
        };
        self.settings(context)
    }
}
