//! Story-set fingerprinting.

use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Hex SHA-256 over an arc's ordered story ids.
///
/// Order-sensitive on purpose: `story_ids` is chronological by invariant,
/// so any append or merge changes the fingerprint and marks the cached
/// summary stale.
#[must_use]
pub fn story_set_fingerprint(story_ids: &[Uuid]) -> String {
    let mut hasher = Sha256::new();
    for id in story_ids {
        hasher.update(id.as_bytes());
    }
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{b:02x}")).collect()
}
