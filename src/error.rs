//! Error types for portrait sync operations.

use std::io;
use thiserror::Error;

/// Errors that can occur while syncing portraits.
#[derive(Error, Debug)]
pub enum PortraitError {
    /// I/O error during file operations.
    #[error(transparent)]
    IoError(#[from] io::Error),

    /// HTTP request error while talking to the object store.
    #[error(transparent)]
    ReqwestError(#[from] reqwest::Error),

    /// The object listing was not valid JSON for the storage API.
    #[error(transparent)]
    SerdeJsonError(#[from] serde_json::Error),

    /// The downloaded bytes could not be decoded or encoded as an image.
    #[error(transparent)]
    ImageError(#[from] image::ImageError),

    /// JPEG encoding of a thumbnail failed.
    #[error(transparent)]
    JpegEncodeError(#[from] jpeg_encoder::EncodingError),

    /// Neither `--id` nor `--from-file` produced a usable identifier.
    #[error("No identifiers provided. Use --id or --from-file.")]
    NoIdentifiers,

    /// General object store failure.
    #[error("Portrait download failed: {0}")]
    DownloadFailed(String),
}
