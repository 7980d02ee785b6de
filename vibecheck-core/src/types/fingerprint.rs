//! Stable content and finding fingerprints (truncated SHA-256).

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Observed state of one file. Replaced whole on re-scan; removed when the
/// path disappears.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFingerprint {
    pub relative_path: String,
    /// First 16 hex chars of SHA-256 over the file bytes; `""` when the
    /// file could not be read. The empty hash is distinct from every real
    /// hash, so unreadable files always re-scan.
    pub content_hash: String,
    pub byte_size: u64,
    pub mtime_ms: u64,
}

/// Full SHA-256 of `bytes` as lowercase hex.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    let mut out = String::with_capacity(64);
    for byte in digest {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}

/// Content hash: first 16 hex chars of SHA-256.
pub fn content_hash(bytes: &[u8]) -> String {
    sha256_hex(bytes)[..16].to_string()
}

/// Cache filename stem: first 32 hex chars of SHA-256 over the key.
pub fn cache_key_hash(key: &str) -> String {
    sha256_hex(key.as_bytes())[..32].to_string()
}

/// Finding fingerprint: SHA-256 over
/// `pattern_id ':' path ':' line ':' redacted_value`, full 64 hex chars.
/// Finding ids truncate this to 16; allowlist entries use all 64.
pub fn finding_fingerprint(pattern_id: &str, path: &str, line: u32, redacted: &str) -> String {
    sha256_hex(format!("{pattern_id}:{path}:{line}:{redacted}").as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_hex_matches_known_vector() {
        // SHA-256("") is a fixed constant.
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn truncations_are_prefixes() {
        let full = sha256_hex(b"vibecheck");
        assert!(full.starts_with(&content_hash(b"vibecheck")));
        assert_eq!(content_hash(b"vibecheck").len(), 16);
        assert_eq!(cache_key_hash("vibecheck").len(), 32);
    }
}
