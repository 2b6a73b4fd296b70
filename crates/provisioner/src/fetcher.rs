//! Archive fetcher
//!
//! Downloads the vendor archive and extracts it into the staging
//! directory, preserving file permissions on POSIX targets. Any failure
//! aborts the provisioning run; there is no retry policy.

use std::path::{Path, PathBuf};

use droidpack_core::{DirSettings, ProvisionError};
use reqwest::Client;
use sha2::{Digest, Sha256};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::sources::ArchiveSource;

/// Download progress callback: (bytes downloaded, total bytes)
pub type ProgressCallback = Box<dyn Fn(u64, u64) + Send + Sync>;

/// Fetch configuration
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Staging directory the archive is extracted into
    pub work_dir: PathBuf,
    /// Verify the archive checksum after download
    pub verify_checksum: bool,
    /// Connection timeout in seconds
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            work_dir: DirSettings::default().work_dir,
            verify_checksum: true,
            timeout_secs: 300,
        }
    }
}

/// Fetch error types
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Checksum mismatch for {0}")]
    ChecksumMismatch(String),
    #[error("Extraction failed: {0}")]
    Extraction(String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl From<FetchError> for ProvisionError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Network(e) => ProvisionError::Network(e.to_string()),
            FetchError::Io(e) => ProvisionError::Io(e),
            FetchError::Extraction(msg) => ProvisionError::Extraction(msg),
            FetchError::ChecksumMismatch(_) | FetchError::InvalidResponse(_) => {
                ProvisionError::Download(err.to_string())
            }
        }
    }
}

/// Vendor archive fetcher
pub struct ArchiveFetcher {
    client: Client,
    config: FetchConfig,
}

impl ArchiveFetcher {
    /// Create a new fetcher
    pub fn new(config: FetchConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    /// Download a file with progress reporting
    pub async fn download_file(
        &self,
        url: &str,
        target: &Path,
        progress: Option<ProgressCallback>,
    ) -> Result<(), FetchError> {
        info!("Downloading {} to {:?}", url, target);

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::InvalidResponse(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let total_size = response.content_length().unwrap_or(0);
        let mut downloaded: u64 = 0;

        let mut file = tokio::fs::File::create(target).await?;
        let mut stream = response.bytes_stream();

        use futures::StreamExt;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            downloaded += chunk.len() as u64;

            if let Some(ref callback) = progress {
                callback(downloaded, total_size);
            }
        }

        file.flush().await?;

        info!("Download complete: {:?}", target);
        Ok(())
    }

    /// Verify file checksum
    pub async fn verify_checksum(path: &Path, expected: &str) -> Result<bool, FetchError> {
        debug!("Verifying checksum for {:?}", path);

        let data = tokio::fs::read(path).await?;
        let mut hasher = Sha256::new();
        hasher.update(&data);
        let actual = hex::encode(hasher.finalize());

        if actual == expected {
            debug!("Checksum verified");
            Ok(true)
        } else {
            warn!("Checksum mismatch: expected {}, got {}", expected, actual);
            Ok(false)
        }
    }

    /// Extract a ZIP archive, preserving Unix modes
    pub async fn extract_zip(archive: &Path, target_dir: &Path) -> Result<(), FetchError> {
        info!("Extracting {:?} to {:?}", archive, target_dir);

        let archive = archive.to_path_buf();
        let target_dir = target_dir.to_path_buf();

        // the zip crate is synchronous
        tokio::task::spawn_blocking(move || {
            let file = std::fs::File::open(&archive).map_err(FetchError::Io)?;
            let mut zip =
                zip::ZipArchive::new(file).map_err(|e| FetchError::Extraction(e.to_string()))?;

            for i in 0..zip.len() {
                let mut entry = zip
                    .by_index(i)
                    .map_err(|e| FetchError::Extraction(e.to_string()))?;

                let outpath = target_dir.join(entry.name());

                if entry.is_dir() {
                    std::fs::create_dir_all(&outpath).map_err(FetchError::Io)?;
                } else {
                    if let Some(parent) = outpath.parent() {
                        std::fs::create_dir_all(parent).map_err(FetchError::Io)?;
                    }
                    let mut outfile = std::fs::File::create(&outpath).map_err(FetchError::Io)?;
                    std::io::copy(&mut entry, &mut outfile).map_err(FetchError::Io)?;
                }

                #[cfg(unix)]
                {
                    use std::os::unix::fs::PermissionsExt;
                    if let Some(mode) = entry.unix_mode() {
                        std::fs::set_permissions(&outpath, std::fs::Permissions::from_mode(mode))
                            .ok();
                    }
                }
            }

            Ok(())
        })
        .await
        .map_err(|e| FetchError::Extraction(e.to_string()))?
    }

    /// Extract a tar.gz archive
    pub async fn extract_tar_gz(archive: &Path, target_dir: &Path) -> Result<(), FetchError> {
        info!("Extracting {:?} to {:?}", archive, target_dir);

        let archive = archive.to_path_buf();
        let target_dir = target_dir.to_path_buf();

        tokio::task::spawn_blocking(move || {
            let file = std::fs::File::open(&archive).map_err(FetchError::Io)?;
            let gz = flate2::read::GzDecoder::new(file);
            let mut tar = tar::Archive::new(gz);

            tar.unpack(&target_dir)
                .map_err(|e| FetchError::Extraction(e.to_string()))?;

            Ok(())
        })
        .await
        .map_err(|e| FetchError::Extraction(e.to_string()))?
    }

    /// Download, verify, and extract a vendor archive. Returns the staged
    /// SDK root (the working directory the archive was unpacked into).
    pub async fn fetch(
        &self,
        source: &ArchiveSource,
        progress: Option<ProgressCallback>,
    ) -> Result<PathBuf, FetchError> {
        tokio::fs::create_dir_all(&self.config.work_dir).await?;

        let file_name = source.url.rsplit('/').next().unwrap_or("cmdline-tools.zip");
        let archive_path = self.config.work_dir.join(file_name);

        self.download_file(source.url, &archive_path, progress).await?;

        if self.config.verify_checksum
            && !Self::verify_checksum(&archive_path, source.sha256).await?
        {
            tokio::fs::remove_file(&archive_path).await?;
            return Err(FetchError::ChecksumMismatch(source.url.to_string()));
        }

        if file_name.ends_with(".tar.gz") || file_name.ends_with(".tgz") {
            Self::extract_tar_gz(&archive_path, &self.config.work_dir).await?;
        } else {
            Self::extract_zip(&archive_path, &self.config.work_dir).await?;
        }

        tokio::fs::remove_file(&archive_path).await?;

        info!("Vendor archive staged at {:?}", self.config.work_dir);
        Ok(self.config.work_dir.clone())
    }

    /// Get the staging directory
    pub fn work_dir(&self) -> &Path {
        &self.config.work_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_verify_checksum_matches() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("archive.zip");
        tokio::fs::write(&path, b"droidpack test data").await.unwrap();

        let ok = ArchiveFetcher::verify_checksum(
            &path,
            "d8d8bae6e36149bbf34a47bdd3ed336f727f8ad82af4ae675b1b14c9a21e5214",
        )
        .await
        .unwrap();
        assert!(ok);
    }

    #[tokio::test]
    async fn test_verify_checksum_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("archive.zip");
        tokio::fs::write(&path, b"other data").await.unwrap();

        let ok = ArchiveFetcher::verify_checksum(
            &path,
            "d8d8bae6e36149bbf34a47bdd3ed336f727f8ad82af4ae675b1b14c9a21e5214",
        )
        .await
        .unwrap();
        assert!(!ok);
    }
}
