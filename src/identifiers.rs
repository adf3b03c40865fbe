//! Identifier resolution from `--id` values and identifier files.

use crate::error::PortraitError;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::debug;

/// Merges explicit identifiers with those read from a newline separated file.
///
/// Whitespace is trimmed, empty entries are dropped, and the result is
/// deduplicated and sorted.
///
/// # Arguments
///
/// * `ids` - Identifiers passed with `--id`
/// * `from_file` - Optional path to a file with one identifier per line
///
/// # Returns
///
/// The sorted identifier list, `PortraitError::NoIdentifiers` if it is empty,
/// or an I/O error if the file cannot be read.
pub fn resolve_identifiers(
    ids: &[String],
    from_file: Option<&Path>,
) -> Result<Vec<String>, PortraitError> {
    let file_contents = match from_file {
        Some(path) => {
            debug!("Reading identifiers from {}", path.display());
            std::fs::read_to_string(path)?
        }
        None => String::new(),
    };

    let resolved = merge_identifiers(file_contents.lines().chain(ids.iter().map(String::as_str)));
    if resolved.is_empty() {
        return Err(PortraitError::NoIdentifiers);
    }
    Ok(resolved)
}

fn merge_identifiers<'a>(raw: impl Iterator<Item = &'a str>) -> Vec<String> {
    raw.map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
