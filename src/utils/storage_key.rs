//! Storage key generation for uploaded files.
//!
//! Uploaded files are stored under a random key rather than their display name,
//! so two uploads of `report.pdf` never overwrite each other. The original
//! extension is kept to make the object store browsable.

use rand::Rng;
use rand::distr::Alphanumeric;

/// Length of the random part of a storage key.
const KEY_LENGTH: usize = 15;

/// Longest extension carried over from the original filename.
const MAX_EXTENSION_LENGTH: usize = 10;

/// Generates a storage key for a file with the given display name.
///
/// The key is 15 random ASCII alphanumerics followed by the original extension
/// (if it is short and alphanumeric).
///
/// # Examples
///
/// ```ignore
/// let key = generate_storage_key("report.final.pdf");
/// assert!(key.ends_with(".pdf"));
/// assert_eq!(key.len(), 15 + 4);
/// ```
pub fn generate_storage_key(filename: &str) -> String {
    let stem: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(KEY_LENGTH)
        .map(char::from)
        .collect();

    match safe_extension(filename) {
        Some(ext) => format!("{stem}.{ext}"),
        None => stem,
    }
}

/// Returns the extension of `filename` if it is safe to embed in a key.
fn safe_extension(filename: &str) -> Option<&str> {
    let (base, ext) = filename.rsplit_once('.')?;

    if base.is_empty() || ext.is_empty() || ext.len() > MAX_EXTENSION_LENGTH {
        return None;
    }

    ext.chars()
        .all(|c| c.is_ascii_alphanumeric())
        .then_some(ext)
}

/// Checks that a key only holds characters [`generate_storage_key`] can produce.
///
/// Object stores use this to refuse keys that could escape their namespace.
pub fn is_valid_storage_key(key: &str) -> bool {
    !key.is_empty()
        && !key.starts_with('.')
        && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '.')
        && !key.contains("..")
}
