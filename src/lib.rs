//! PortraitSync - faculty portrait fetcher and thumbnail renderer
//!
//! This library pulls the largest image stored under each person's prefix in a
//! Google Cloud Storage bucket and writes two JPEG thumbnails per person to
//! local disk.
//!
//! # Features
//!
//! - **Largest-image selection**: Picks the biggest `.jpg`/`.jpeg`/`.png`/`.webp`/`.gif`
//!   object under `<identifier>/`
//! - **MD5 Verification**: Checks downloads against the checksum in the listing
//! - **Shrink-only thumbnails**: `cover` (512x512) and `profile` (256x256), never upscaled
//! - **Per-identifier isolation**: One broken portrait does not stop the batch
//!   unless fail-fast is requested
//!
//! # Example
//!
//! ```no_run
//! use portraitsync::{resolve_identifiers, sync_portraits, GcsClient, SyncConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SyncConfig {
//!     output_dir: "portraits".into(),
//!     ..SyncConfig::default()
//! };
//! let identifiers = resolve_identifiers(&["jane-doe".to_string()], None)?;
//! let store = GcsClient::new(&config)?;
//!
//! sync_portraits(&config, &store, &identifiers).await?;
//! # Ok(())
//! # }
//! ```

mod error;
mod identifiers;
mod orchestrator;
mod select;
mod storage;
mod thumbnail;
mod types;

pub use error::PortraitError;
pub use identifiers::resolve_identifiers;
pub use orchestrator::{identifier_prefix, process_identifier, sync_portraits, IdentifierOutcome};
pub use select::{choose_primary_object, is_image_object, IMAGE_EXTENSIONS};
pub use storage::{GcsClient, ObjectStore};
pub use thumbnail::{
    decode_portrait, fit_within, normalize_color, render_portrait, render_thumbnails, write_jpeg,
    JPEG_QUALITY,
};
pub use types::{
    RemoteObject, SyncConfig, SyncSummary, ThumbnailSpec, DEFAULT_BUCKET, DEFAULT_ENDPOINT,
    THUMBNAILS,
};
