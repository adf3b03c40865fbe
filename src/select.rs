//! Selection of the source portrait among the objects under a prefix.

use crate::types::RemoteObject;
use std::path::Path;

/// File extensions (lowercase, without the dot) treated as portraits.
pub const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "webp", "gif"];

/// Returns true if the object name looks like an image file.
///
/// Directory markers (names ending in `/`) never qualify. The extension
/// check is case-insensitive.
pub fn is_image_object(name: &str) -> bool {
    if name.ends_with('/') {
        return false;
    }
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Picks the largest image object from a listing.
///
/// Objects without a reported size count as zero bytes. When several
/// objects share the largest size, the first one in listing order wins.
///
/// # Returns
///
/// The chosen object, or `None` if no object is an eligible image.
pub fn choose_primary_object(objects: &[RemoteObject]) -> Option<&RemoteObject> {
    objects
        .iter()
        .filter(|object| is_image_object(&object.name))
        .reduce(|best, candidate| {
            if candidate.size.unwrap_or(0) > best.size.unwrap_or(0) {
                candidate
            } else {
                best
            }
        })
}
