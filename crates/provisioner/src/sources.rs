//! Vendor archive sources
//!
//! Static lookup table of the command-line tools archive for a
//! (release, operating system) pair. One entry per supported pair; an
//! unknown pair is a fatal configuration error resolved before any
//! download starts.

use droidpack_core::{Os, ProvisionError, Result};

/// A downloadable vendor archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSource {
    /// Command-line tools release this archive belongs to
    pub release: &'static str,
    /// Host operating system the archive targets
    pub os: Os,
    /// Download URL
    pub url: &'static str,
    /// Expected SHA-256 of the archive
    pub sha256: &'static str,
    /// Approximate archive size in bytes
    pub size: u64,
}

const SOURCES: &[ArchiveSource] = &[
    ArchiveSource {
        release: "11076708",
        os: Os::Windows,
        url: "https://dl.google.com/android/repository/commandlinetools-win-11076708_latest.zip",
        sha256: "4d6931209eebb1bfb7c7e8b240a6a3cb3ab24479ea294f3539429574b1eec862",
        size: 149_000_000,
    },
    ArchiveSource {
        release: "11076708",
        os: Os::Macos,
        url: "https://dl.google.com/android/repository/commandlinetools-mac-11076708_latest.zip",
        sha256: "7bc5c72ba0275c80a8f19684fb92793b83e8e5234be12c7f8e6d42c5c9bd787d",
        size: 149_000_000,
    },
    ArchiveSource {
        release: "11076708",
        os: Os::Linux,
        url: "https://dl.google.com/android/repository/commandlinetools-linux-11076708_latest.zip",
        sha256: "2d2d50857e4eb553af5a6dc3ad507a17adf43d115264b1afc116f95c92e5e258",
        size: 149_000_000,
    },
    ArchiveSource {
        release: "10406996",
        os: Os::Windows,
        url: "https://dl.google.com/android/repository/commandlinetools-win-10406996_latest.zip",
        sha256: "a2b7dc2b3fd0a0ce6bdb9e723ca5ff6eac4969e1bbd364814bb90fd67ad57e32",
        size: 147_000_000,
    },
    ArchiveSource {
        release: "10406996",
        os: Os::Macos,
        url: "https://dl.google.com/android/repository/commandlinetools-mac-10406996_latest.zip",
        sha256: "a9daacb4632b5d06048c2e2d0b6aa8b5e62ab4a3efae3ae302f0fcda95b4f79b",
        size: 147_000_000,
    },
    ArchiveSource {
        release: "10406996",
        os: Os::Linux,
        url: "https://dl.google.com/android/repository/commandlinetools-linux-10406996_latest.zip",
        sha256: "8919e8752979db73d8321e9babe2caedcc393750817c1a5f56c9d45917c6079f",
        size: 147_000_000,
    },
];

/// Resolve the archive for a command-line tools release on a host OS
pub fn archive_source(release: &str, os: Os) -> Result<&'static ArchiveSource> {
    SOURCES
        .iter()
        .find(|source| source.release == release && source.os == os)
        .ok_or_else(|| ProvisionError::UnknownSource {
            release: release.to_string(),
            os,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_pairs_resolve() {
        for os in Os::supported_hosts() {
            let source = archive_source("11076708", *os).unwrap();
            assert_eq!(source.os, *os);
            assert!(source.url.contains("11076708"));
        }
    }

    #[test]
    fn test_archive_key_matches_url() {
        for os in Os::supported_hosts() {
            let source = archive_source("10406996", *os).unwrap();
            let key = os.archive_key().unwrap();
            assert!(source.url.contains(&format!("commandlinetools-{}-", key)));
        }
    }

    #[test]
    fn test_unknown_release_rejected() {
        let err = archive_source("99999999", Os::Linux).unwrap_err();
        assert!(matches!(err, ProvisionError::UnknownSource { .. }));
    }

    #[test]
    fn test_non_host_os_rejected() {
        let err = archive_source("11076708", Os::Android).unwrap_err();
        assert!(matches!(err, ProvisionError::UnknownSource { .. }));
    }
}
