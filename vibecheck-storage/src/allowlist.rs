//! Secrets allowlist: one SHA-256 fingerprint per line, `#` comments.
//! Matching is case-insensitive.

use std::path::{Path, PathBuf};

use vibecheck_core::FxHashSet;

use crate::paths;

/// In-memory view of `secrets.allowlist`.
#[derive(Debug, Clone, Default)]
pub struct Allowlist {
    path: Option<PathBuf>,
    lines: Vec<String>,
    entries: FxHashSet<String>,
}

impl Allowlist {
    /// Load from `<project>/.vibecheck/secrets.allowlist`. Missing file is
    /// an empty allowlist.
    pub fn for_project(project_root: &Path) -> Self {
        Self::load(paths::allowlist_path(project_root))
    }

    /// Load from an explicit path.
    pub fn load(path: PathBuf) -> Self {
        let raw = std::fs::read_to_string(&path).unwrap_or_default();
        let lines: Vec<String> = raw.lines().map(str::to_string).collect();
        let entries = lines
            .iter()
            .map(|line| line.trim())
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_ascii_lowercase)
            .collect();
        Self {
            path: Some(path),
            lines,
            entries,
        }
    }

    /// Whether a fingerprint is suppressed.
    pub fn contains(&self, fingerprint: &str) -> bool {
        self.entries.contains(&fingerprint.to_ascii_lowercase())
    }

    /// Add a fingerprint (idempotent). Returns true if it was new.
    pub fn add(&mut self, fingerprint: &str) -> bool {
        let normalized = fingerprint.to_ascii_lowercase();
        if self.entries.insert(normalized.clone()) {
            self.lines.push(normalized);
            true
        } else {
            false
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rewrite the file, preserving comments and ordering.
    pub fn save(&self) -> std::io::Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut body = self.lines.join("\n");
        body.push('\n');
        std::fs::write(path, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comments_and_matches_case_insensitively() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secrets.allowlist");
        std::fs::write(&path, "# reviewed 2026-07\nDEADBEEF00\n\nabc123\n").unwrap();
        let allowlist = Allowlist::load(path);
        assert_eq!(allowlist.len(), 2);
        assert!(allowlist.contains("deadbeef00"));
        assert!(allowlist.contains("ABC123"));
        assert!(!allowlist.contains("# reviewed 2026-07"));
    }

    #[test]
    fn add_and_save_preserves_comments() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secrets.allowlist");
        std::fs::write(&path, "# keep me\naaaa\n").unwrap();
        let mut allowlist = Allowlist::load(path.clone());
        assert!(allowlist.add("BBBB"));
        assert!(!allowlist.add("bbbb"));
        allowlist.save().unwrap();
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("# keep me"));
        assert!(raw.contains("bbbb"));
    }
}
