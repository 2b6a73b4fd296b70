//! sdkmanager wrapper
//!
//! Drives the vendor installer bundled with the command-line tools:
//! license acceptance, component installation, and installed-package
//! listing. The installer itself is an opaque collaborator; this module
//! only builds its command lines and supervises the child processes.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use droidpack_core::ProvisionError;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

/// SDK components the provisioner installs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SdkComponent {
    /// platforms;android-XX
    Platform(u32),
    /// build-tools;XX.X.X
    BuildTools(String),
    /// platform-tools
    PlatformTools,
    /// ndk;XX.X.XXXXXXX
    Ndk(String),
}

impl SdkComponent {
    /// Package spec understood by sdkmanager
    pub fn package_name(&self) -> String {
        match self {
            SdkComponent::Platform(api) => format!("platforms;android-{}", api),
            SdkComponent::BuildTools(revision) => format!("build-tools;{}", revision),
            SdkComponent::PlatformTools => "platform-tools".to_string(),
            SdkComponent::Ndk(version) => format!("ndk;{}", version),
        }
    }
}

/// Installed package info parsed from `--list_installed`
#[derive(Debug, Clone)]
pub struct InstalledComponent {
    pub package: String,
    pub version: String,
    pub description: String,
    pub location: PathBuf,
}

/// sdkmanager errors
#[derive(Debug, thiserror::Error)]
pub enum SdkManagerError {
    #[error("sdkmanager not found under {0}")]
    SdkManagerNotFound(PathBuf),
    #[error("Command failed: {0}")]
    CommandFailed(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<SdkManagerError> for ProvisionError {
    fn from(err: SdkManagerError) -> Self {
        match err {
            SdkManagerError::Io(e) => ProvisionError::Io(e),
            other => ProvisionError::Process(other.to_string()),
        }
    }
}

/// Cap on scripted license responses. The response loop normally ends
/// earlier, when the tool stops reading its stdin.
const MAX_LICENSE_RESPONSES: usize = 256;

/// Wrapper around the vendored sdkmanager binary
#[derive(Debug)]
pub struct SdkManagerClient {
    sdk_root: PathBuf,
    sdkmanager_path: PathBuf,
    java_home: Option<PathBuf>,
}

impl SdkManagerClient {
    /// Locate sdkmanager inside a staged SDK root
    pub fn new(sdk_root: PathBuf) -> Result<Self, SdkManagerError> {
        let sdkmanager_path = Self::find_sdkmanager(&sdk_root)?;

        Ok(Self {
            sdk_root,
            sdkmanager_path,
            java_home: None,
        })
    }

    /// Set the JAVA_HOME for installer invocations
    pub fn set_java_home(&mut self, java_home: PathBuf) {
        self.java_home = Some(java_home);
    }

    /// Find the sdkmanager executable under a staged root
    fn find_sdkmanager(sdk_root: &Path) -> Result<PathBuf, SdkManagerError> {
        let exe_name = if cfg!(windows) {
            "sdkmanager.bat"
        } else {
            "sdkmanager"
        };

        // freshly extracted archives place it at cmdline-tools/bin;
        // relocated installs use cmdline-tools/latest or a versioned dir
        let candidates = [
            sdk_root.join("cmdline-tools").join("bin").join(exe_name),
            sdk_root
                .join("cmdline-tools")
                .join("latest")
                .join("bin")
                .join(exe_name),
        ];
        for candidate in candidates {
            if candidate.exists() {
                return Ok(candidate);
            }
        }

        let cmdline_tools = sdk_root.join("cmdline-tools");
        if let Ok(entries) = std::fs::read_dir(&cmdline_tools) {
            for entry in entries.flatten() {
                let candidate = entry.path().join("bin").join(exe_name);
                if candidate.exists() {
                    return Ok(candidate);
                }
            }
        }

        Err(SdkManagerError::SdkManagerNotFound(sdk_root.to_path_buf()))
    }

    /// Create the base command with the SDK root argument and environment
    fn create_command(&self) -> Command {
        let mut cmd = Command::new(&self.sdkmanager_path);

        cmd.arg(format!("--sdk_root={}", self.sdk_root.display()));
        cmd.env("ANDROID_SDK_ROOT", &self.sdk_root);
        cmd.env("ANDROID_HOME", &self.sdk_root);

        if let Some(java_home) = &self.java_home {
            cmd.env("JAVA_HOME", java_home);
        }

        cmd
    }

    /// Accept all license prompts. Affirmative responses are fed until the
    /// tool stops reading them, so a changed prompt count cannot
    /// under-supply answers.
    pub async fn accept_licenses(&self) -> Result<(), SdkManagerError> {
        info!("Accepting Android SDK licenses...");

        let mut child = self
            .create_command()
            .arg("--licenses")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            for _ in 0..MAX_LICENSE_RESPONSES {
                if stdin.write_all(b"y\n").await.is_err() {
                    // pipe closed: no prompts left
                    break;
                }
            }
        }

        let output = child.wait_with_output().await?;

        if !output.status.success() {
            // some tool releases exit non-zero after printing the
            // acceptance summary
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!("License acceptance exited non-zero: {}", stderr.trim());
        }

        info!("Licenses accepted");
        Ok(())
    }

    /// Install a single component as its own blocking installer call.
    /// Installer output is drained to debug logs, away from the console.
    pub async fn install(&self, component: &SdkComponent) -> Result<(), SdkManagerError> {
        let package = component.package_name();
        info!("Installing SDK package {}", package);

        let mut child = self
            .create_command()
            .arg("--install")
            .arg(&package)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        // answer any stray prompt, then close stdin
        if let Some(mut stdin) = child.stdin.take() {
            for _ in 0..8 {
                if stdin.write_all(b"y\n").await.is_err() {
                    break;
                }
            }
        }

        if let Some(stdout) = child.stdout.take() {
            let reader = BufReader::new(stdout);
            let mut lines = reader.lines();

            while let Ok(Some(line)) = lines.next_line().await {
                debug!("sdkmanager: {}", line);
            }
        }

        let status = child.wait().await?;

        if !status.success() {
            return Err(SdkManagerError::CommandFailed(format!(
                "install {} exited with code {:?}",
                package,
                status.code()
            )));
        }

        info!("Installed {}", package);
        Ok(())
    }

    /// Install components sequentially, in order, aborting the remaining
    /// steps on the first failure
    pub async fn install_all(&self, components: &[SdkComponent]) -> Result<(), SdkManagerError> {
        for component in components {
            self.install(component).await?;
        }
        Ok(())
    }

    /// List installed packages
    pub async fn list_installed(&self) -> Result<Vec<InstalledComponent>, SdkManagerError> {
        debug!("Listing installed SDK packages...");

        let output = self.create_command().arg("--list_installed").output().await?;

        if !output.status.success() {
            return Err(SdkManagerError::CommandFailed(
                String::from_utf8_lossy(&output.stderr).to_string(),
            ));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(Self::parse_installed_output(&stdout, &self.sdk_root))
    }

    /// Parse the `--list_installed` table output
    fn parse_installed_output(output: &str, sdk_root: &Path) -> Vec<InstalledComponent> {
        let mut components = Vec::new();
        let mut in_packages = false;

        for line in output.lines() {
            let line = line.trim();

            if line.starts_with("Installed packages:") {
                in_packages = true;
                continue;
            }

            if in_packages && !line.is_empty() && !line.starts_with("---") && !line.starts_with("Path") {
                let parts: Vec<&str> = line.split('|').map(|s| s.trim()).collect();
                if parts.len() >= 3 {
                    components.push(InstalledComponent {
                        package: parts[0].to_string(),
                        version: parts[1].to_string(),
                        description: parts[2].to_string(),
                        location: sdk_root.join(parts[0].replace(';', std::path::MAIN_SEPARATOR_STR)),
                    });
                }
            }
        }

        components
    }

    /// Get the SDK root path
    pub fn sdk_root(&self) -> &Path {
        &self.sdk_root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_package_name() {
        assert_eq!(
            SdkComponent::Platform(34).package_name(),
            "platforms;android-34"
        );
        assert_eq!(
            SdkComponent::BuildTools("33.0.2".into()).package_name(),
            "build-tools;33.0.2"
        );
        assert_eq!(SdkComponent::PlatformTools.package_name(), "platform-tools");
        assert_eq!(
            SdkComponent::Ndk("26.1.10909125".into()).package_name(),
            "ndk;26.1.10909125"
        );
    }

    #[test]
    fn test_parse_installed_output() {
        let output = "\
Loading package information...

Installed packages:
  Path              | Version | Description              | Location
  -------           | ------- | -------                  | -------
  build-tools;33.0.2 | 33.0.2 | Android SDK Build-Tools  | build-tools/33.0.2
  platform-tools    | 35.0.1  | Android SDK Platform-Tools | platform-tools
  platforms;android-34 | 3    | Android SDK Platform 34  | platforms/android-34
";
        let components =
            SdkManagerClient::parse_installed_output(output, Path::new("/sdk"));

        assert_eq!(components.len(), 3);
        assert_eq!(components[0].package, "build-tools;33.0.2");
        assert_eq!(components[1].version, "35.0.1");
        assert_eq!(
            components[2].location,
            Path::new("/sdk").join("platforms").join("android-34")
        );
    }

    #[test]
    fn test_missing_sdkmanager_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = SdkManagerClient::new(dir.path().to_path_buf()).unwrap_err();
        assert!(matches!(err, SdkManagerError::SdkManagerNotFound(_)));
    }

    #[test]
    fn test_find_sdkmanager_in_archive_layout() {
        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("cmdline-tools").join("bin");
        std::fs::create_dir_all(&bin).unwrap();
        let exe = if cfg!(windows) {
            "sdkmanager.bat"
        } else {
            "sdkmanager"
        };
        std::fs::write(bin.join(exe), "").unwrap();

        let client = SdkManagerClient::new(dir.path().to_path_buf()).unwrap();
        assert_eq!(client.sdk_root(), dir.path());
    }
}
