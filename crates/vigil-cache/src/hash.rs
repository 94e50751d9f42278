use sha2::{Digest, Sha256};
use std::path::Path;

/// SHA-256 hex digest of a file's contents. On any read error a synthetic,
/// never-matching token is returned instead of propagating, so a previously
/// cached entry for this path simply misses (spec.md §4.4 "Hash").
pub async fn hash_file_or_synth(path: &Path) -> String {
    match tokio::fs::read(path).await {
        Ok(bytes) => hash_bytes(&bytes),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "hashing cache key failed, synthesizing a miss token");
            synth_miss_token()
        }
    }
}

pub fn hash_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

fn synth_miss_token() -> String {
    format!("unreadable-{:032x}", rand::random::<u128>())
}
