//! Packager
//!
//! Copies the installed SDK trees into the output package. Safe to invoke
//! more than once: a source directory that is not staged yet is skipped,
//! so an early call before installation is a no-op rather than an error.

use std::path::{Path, PathBuf};

use droidpack_core::ProvisionError;
use tracing::{debug, info, warn};

use crate::{NDK_DIR, PACKAGE_DIRS};

/// Packaging errors
#[derive(Debug, thiserror::Error)]
pub enum PackageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Copy failed: {0}")]
    Copy(String),
}

impl From<PackageError> for ProvisionError {
    fn from(err: PackageError) -> Self {
        match err {
            PackageError::Io(e) => ProvisionError::Io(e),
            PackageError::Copy(msg) => ProvisionError::Package(msg),
        }
    }
}

/// Copies installed top-level SDK directories into the output package
pub struct Packager {
    staging_dir: PathBuf,
    package_dir: PathBuf,
}

impl Packager {
    /// Create a packager between a staging root and an output directory
    pub fn new(staging_dir: PathBuf, package_dir: PathBuf) -> Self {
        Self {
            staging_dir,
            package_dir,
        }
    }

    /// Copy the allow-listed top-level directories into the package.
    /// Returns the names of the directories that were copied.
    pub async fn package(&self, include_ndk: bool) -> Result<Vec<String>, PackageError> {
        tokio::fs::create_dir_all(&self.package_dir).await?;

        let mut names: Vec<&str> = PACKAGE_DIRS.to_vec();
        if include_ndk {
            names.push(NDK_DIR);
        }

        let mut copied = Vec::new();
        for name in names {
            let src = self.staging_dir.join(name);
            if !src.exists() {
                warn!("Skipping {}: not present in {:?}", name, self.staging_dir);
                continue;
            }

            let dst = self.package_dir.join(name);
            tokio::task::spawn_blocking(move || copy_tree(&src, &dst))
                .await
                .map_err(|e| PackageError::Copy(e.to_string()))??;

            debug!("Packaged {}", name);
            copied.push(name.to_string());
        }

        info!(
            "Packaged {} directories into {:?}",
            copied.len(),
            self.package_dir
        );
        Ok(copied)
    }

    /// Get the output package directory
    pub fn package_dir(&self) -> &Path {
        &self.package_dir
    }
}

/// Recursive copy. `std::fs::copy` carries permission bits, so installed
/// tool binaries stay executable on POSIX targets.
fn copy_tree(src: &Path, dst: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(dst)?;

    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let target = dst.join(entry.file_name());

        if file_type.is_dir() {
            copy_tree(&entry.path(), &target)?;
        } else if file_type.is_symlink() {
            #[cfg(unix)]
            {
                let link = std::fs::read_link(entry.path())?;
                if target.exists() {
                    std::fs::remove_file(&target)?;
                }
                std::os::unix::fs::symlink(link, &target)?;
            }
            #[cfg(not(unix))]
            {
                std::fs::copy(entry.path(), &target)?;
            }
        } else {
            std::fs::copy(entry.path(), &target)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn stage_sdk(staging: &Path) {
        for name in PACKAGE_DIRS {
            let dir = staging.join(name);
            std::fs::create_dir_all(&dir).unwrap();
            std::fs::write(dir.join("marker.txt"), *name).unwrap();
        }
        // directories sdkmanager leaves behind that must never be packaged
        std::fs::create_dir_all(staging.join("cmdline-tools")).unwrap();
        std::fs::create_dir_all(staging.join(".temp")).unwrap();
    }

    fn top_level_entries(dir: &Path) -> BTreeSet<String> {
        std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_packages_exactly_expected_directories() {
        let staging = tempfile::tempdir().unwrap();
        let package = tempfile::tempdir().unwrap();
        stage_sdk(staging.path());

        let packager = Packager::new(staging.path().to_path_buf(), package.path().to_path_buf());
        let copied = packager.package(false).await.unwrap();

        assert_eq!(copied.len(), PACKAGE_DIRS.len());
        let expected: BTreeSet<String> =
            PACKAGE_DIRS.iter().map(|s| s.to_string()).collect();
        assert_eq!(top_level_entries(package.path()), expected);

        let marker = package.path().join("build-tools").join("marker.txt");
        assert_eq!(std::fs::read_to_string(marker).unwrap(), "build-tools");
    }

    #[tokio::test]
    async fn test_ndk_packaged_only_when_requested() {
        let staging = tempfile::tempdir().unwrap();
        let package = tempfile::tempdir().unwrap();
        stage_sdk(staging.path());
        std::fs::create_dir_all(staging.path().join(NDK_DIR).join("26.1.10909125")).unwrap();

        let packager = Packager::new(staging.path().to_path_buf(), package.path().to_path_buf());

        let copied = packager.package(false).await.unwrap();
        assert!(!copied.contains(&NDK_DIR.to_string()));
        assert!(!package.path().join(NDK_DIR).exists());

        let copied = packager.package(true).await.unwrap();
        assert!(copied.contains(&NDK_DIR.to_string()));
        assert!(package.path().join(NDK_DIR).join("26.1.10909125").exists());
    }

    #[tokio::test]
    async fn test_idempotent_over_repeated_calls() {
        let staging = tempfile::tempdir().unwrap();
        let package = tempfile::tempdir().unwrap();
        stage_sdk(staging.path());

        let packager = Packager::new(staging.path().to_path_buf(), package.path().to_path_buf());
        packager.package(false).await.unwrap();
        packager.package(false).await.unwrap();

        let expected: BTreeSet<String> =
            PACKAGE_DIRS.iter().map(|s| s.to_string()).collect();
        assert_eq!(top_level_entries(package.path()), expected);
    }

    #[tokio::test]
    async fn test_unstaged_sources_are_skipped() {
        // first framework pass runs before anything was installed
        let staging = tempfile::tempdir().unwrap();
        let package = tempfile::tempdir().unwrap();

        let packager = Packager::new(
            staging.path().join("missing"),
            package.path().to_path_buf(),
        );
        let copied = packager.package(true).await.unwrap();

        assert!(copied.is_empty());
        assert!(top_level_entries(package.path()).is_empty());
    }
}
