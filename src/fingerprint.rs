use sha2::{Digest, Sha256};

/// Derive the dedup fingerprint for an item from its title and identity key
/// (the item URL). The concatenation is lowercased and trimmed so that feeds
/// which vary casing or padding between polls still collapse to one item.
///
/// Deterministic, byte-stable for identical input, no failure modes. Only ever
/// compared within a single run.
pub fn fingerprint(title: &str, identity_key: &str) -> String {
    // Each part is trimmed on its own; trimming the concatenation would leave
    // a trailing title space buried in the middle of the string.
    let normalized = format!("{}{}", title.trim(), identity_key.trim()).to_lowercase();

    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    format!("{:x}", hasher.finalize())
}
