// Content Checksums
//
// SHA-256 fingerprints used to tell whether a file's content changed between
// two iterations, independent of modification times.

use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 of `content`.
pub fn content_fingerprint(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}
