//! Main orchestration logic for syncing portraits.

use crate::error::PortraitError;
use crate::select::choose_primary_object;
use crate::storage::ObjectStore;
use crate::thumbnail::render_portrait;
use crate::types::{SyncConfig, SyncSummary, THUMBNAILS};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// What happened to a single identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentifierOutcome {
    /// Thumbnails were written to these paths.
    Saved(Vec<PathBuf>),
    /// No eligible image exists under the identifier's prefix.
    NoCandidate,
}

/// Storage prefix for an identifier: the identifier with exactly one trailing `/`.
pub fn identifier_prefix(identifier: &str) -> String {
    format!("{}/", identifier.trim_end_matches('/'))
}

/// Fetches and renders the portrait for every identifier, one at a time.
///
/// For each identifier this lists `<identifier>/`, picks the largest image,
/// downloads it and writes `<output_dir>/<identifier>/{cover,profile}.jpg`.
/// Identifiers without an image are skipped with a warning.
///
/// # Arguments
///
/// * `config` - Sync configuration (output directory and failure policy)
/// * `store` - Object store to list and download from
/// * `identifiers` - Resolved identifiers, processed in the given order
///
/// # Returns
///
/// A summary of the run. With `fail_fast` set, the first per-identifier
/// error is returned instead and remaining identifiers are left untouched;
/// otherwise failures are recorded in the summary and the run continues.
///
/// # Example
///
/// ```no_run
/// use portraitsync::{sync_portraits, GcsClient, SyncConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = SyncConfig::default();
/// let store = GcsClient::new(&config)?;
/// let summary = sync_portraits(&config, &store, &["jane-doe".to_string()]).await?;
/// println!("{} processed", summary.processed);
/// # Ok(())
/// # }
/// ```
pub async fn sync_portraits<S: ObjectStore + ?Sized>(
    config: &SyncConfig,
    store: &S,
    identifiers: &[String],
) -> Result<SyncSummary, PortraitError> {
    let started = Instant::now();
    let pb = progress_bar(identifiers.len());
    let mut summary = SyncSummary::default();

    for identifier in identifiers {
        pb.set_message(format!("| {}", identifier));

        match process_identifier(store, identifier, &config.output_dir).await {
            Ok(IdentifierOutcome::Saved(paths)) => {
                debug!("Wrote {} thumbnails for {}", paths.len(), identifier);
                summary.processed += 1;
            }
            Ok(IdentifierOutcome::NoCandidate) => summary.skipped += 1,
            Err(e) if config.fail_fast => {
                error!("Failed to process '{}': {}", identifier, e);
                pb.finish_with_message("❌ Sync aborted!");
                return Err(e);
            }
            Err(e) => {
                error!("Failed to process '{}': {}", identifier, e);
                summary.failed.push((identifier.clone(), e.to_string()));
            }
        }

        pb.inc(1);
    }

    pb.finish_with_message(format!(
        "✅ {} processed, {} skipped, {} failed",
        summary.processed,
        summary.skipped,
        summary.failed.len()
    ));
    info!(
        "Synced {} identifiers in {}",
        identifiers.len(),
        humantime::format_duration(Duration::from_secs(started.elapsed().as_secs()))
    );

    Ok(summary)
}

/// Runs list → select → download → render for one identifier.
pub async fn process_identifier<S: ObjectStore + ?Sized>(
    store: &S,
    identifier: &str,
    output_dir: &Path,
) -> Result<IdentifierOutcome, PortraitError> {
    let prefix = identifier_prefix(identifier);
    let objects = store.list_objects(&prefix).await?;

    let Some(object) = choose_primary_object(&objects) else {
        warn!("No portrait images found for '{}'", identifier);
        return Ok(IdentifierOutcome::NoCandidate);
    };

    info!(
        "Downloading {} (size={}) for {}",
        object.name,
        object
            .size
            .map_or_else(|| "unknown".to_string(), |s| s.to_string()),
        identifier
    );
    let bytes = store.download(object).await?;

    let person_dir = output_dir.join(identifier);
    let written = render_portrait(bytes, person_dir, &THUMBNAILS).await?;
    Ok(IdentifierOutcome::Saved(written))
}

/// Progress bar over identifiers, hidden when stderr is not a terminal.
fn progress_bar(total: usize) -> indicatif::ProgressBar {
    if !atty::is(atty::Stream::Stderr) {
        return indicatif::ProgressBar::hidden();
    }

    let pb = indicatif::ProgressBar::new(total as u64);
    if let Ok(style) = indicatif::ProgressStyle::default_bar()
        .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg} | {elapsed_precise} elapsed")
    {
        pb.set_style(style.progress_chars("█▓▒░ "));
    }
    pb.set_message(format!("🖼️  Syncing {} portrait(s)", total));
    pb
}
