//! Data structures for portrait sync operations.

use std::path::{Path, PathBuf};

/// Bucket that holds faculty portraits unless `--bucket` says otherwise.
pub const DEFAULT_BUCKET: &str = "afaculty";

/// Public Google Cloud Storage endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://storage.googleapis.com";

/// An object listed under a portrait prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteObject {
    /// Full object key, e.g. `jane-doe/headshot.jpg`.
    pub name: String,
    /// Size in bytes, if the store reported one.
    pub size: Option<u64>,
    /// Base64 MD5 digest of the object contents, if the store reported one.
    pub md5_hash: Option<String>,
}

impl RemoteObject {
    /// Builds an object with a known size and no checksum.
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size: Some(size),
            md5_hash: None,
        }
    }
}

/// A named thumbnail output bounded by a width/height box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThumbnailSpec {
    /// Output file stem (`cover`, `profile`).
    pub name: &'static str,
    /// Maximum width in pixels.
    pub width: u32,
    /// Maximum height in pixels.
    pub height: u32,
    /// File suffix including the dot.
    pub suffix: &'static str,
}

impl ThumbnailSpec {
    /// Path of this thumbnail inside a per-person directory.
    pub fn destination(&self, base_path: &Path) -> PathBuf {
        base_path.join(format!("{}{}", self.name, self.suffix))
    }
}

/// Thumbnails rendered for every portrait.
pub const THUMBNAILS: [ThumbnailSpec; 2] = [
    ThumbnailSpec {
        name: "cover",
        width: 512,
        height: 512,
        suffix: ".jpg",
    },
    ThumbnailSpec {
        name: "profile",
        width: 256,
        height: 256,
        suffix: ".jpg",
    },
];

/// Configuration for a portrait sync run.
///
/// # Example
///
/// ```
/// use portraitsync::SyncConfig;
///
/// let config = SyncConfig {
///     bucket: "afaculty".to_string(),
///     output_dir: "portraits".into(),
///     endpoint: "http://localhost:4443".to_string(),
///     access_token: None,
///     skip_verify: false,
///     fail_fast: false,
/// };
/// ```
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Bucket that stores one prefix per identifier.
    pub bucket: String,
    /// Root directory for `<identifier>/<thumbnail>.jpg` files.
    pub output_dir: PathBuf,
    /// Base URL of the storage JSON API (e.g., `<https://storage.googleapis.com>`)
    pub endpoint: String,
    /// OAuth bearer token. Requests are anonymous when unset, which works
    /// for publicly readable buckets only.
    pub access_token: Option<String>,
    /// Skip MD5 verification of downloaded objects (default: false).
    pub skip_verify: bool,
    /// Abort the whole batch on the first per-identifier failure (default: false).
    pub fail_fast: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            bucket: DEFAULT_BUCKET.to_string(),
            output_dir: PathBuf::from("portraits"),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            access_token: None,
            skip_verify: false,
            fail_fast: false,
        }
    }
}

/// Outcome of a sync run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncSummary {
    /// Identifiers for which every thumbnail was written.
    pub processed: usize,
    /// Identifiers with no eligible image under their prefix.
    pub skipped: usize,
    /// Identifiers whose processing failed, with the error message.
    pub failed: Vec<(String, String)>,
}

impl SyncSummary {
    /// True when no identifier failed.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thumbnail_destination() {
        let base = Path::new("out/jane-doe");
        assert_eq!(
            THUMBNAILS[0].destination(base),
            PathBuf::from("out/jane-doe/cover.jpg")
        );
        assert_eq!(
            THUMBNAILS[1].destination(base),
            PathBuf::from("out/jane-doe/profile.jpg")
        );
    }

    #[test]
    fn test_thumbnail_boxes() {
        assert_eq!((THUMBNAILS[0].width, THUMBNAILS[0].height), (512, 512));
        assert_eq!((THUMBNAILS[1].width, THUMBNAILS[1].height), (256, 256));
    }

    #[test]
    fn test_default_config() {
        let config = SyncConfig::default();
        assert_eq!(config.bucket, "afaculty");
        assert_eq!(config.endpoint, "https://storage.googleapis.com");
        assert!(!config.skip_verify);
        assert!(!config.fail_fast);
    }
}
