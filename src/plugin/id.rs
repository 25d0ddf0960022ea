//! Plugin identity and content digests.

use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::{Component, Path};

/// Derive a short stable identifier from an arbitrary string.
///
/// The first 16 bytes of the SHA-256 digest, hex encoded.
pub fn calc_id(value: &str) -> String {
    let hash = Sha256::digest(value.as_bytes());
    hex::encode(&hash[..16])
}

/// Derive the identity of a plugin from its path below the plugin root.
///
/// The path is normalized to `/<dir>/.../<file>` before hashing, so the same
/// tree installed under different prefixes yields the same ids on every host.
/// Depends only on the path text, never on walk order or file contents.
pub fn plugin_id(relative: &Path) -> String {
    let normalized: String = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(format!("/{}", part.to_string_lossy())),
            _ => None,
        })
        .collect();
    calc_id(&normalized)
}

/// Identity of a synthetic entry split out of `parent_id` for `item`.
pub fn synthetic_id(parent_id: &str, item: &str) -> String {
    format!("{}-{}", parent_id, calc_id(item))
}

/// Digest the bytes of a file for change detection.
pub fn content_hash(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}
