//! Shared project view handed to every evidence collector.

use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Mutex;

use serde::Deserialize;

use vibecheck_core::config::ScanConfig;
use vibecheck_core::types::truthpack::Truthpack;
use vibecheck_core::{FxHashMap, FxHashSet};
use vibecheck_storage::TruthpackStore;

use crate::scanner::walker;

/// The dependency tables of `package.json`. Unknown fields ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageManifest {
    #[serde(default)]
    pub dependencies: FxHashMap<String, String>,
    #[serde(default, rename = "devDependencies")]
    pub dev_dependencies: FxHashMap<String, String>,
    #[serde(default, rename = "peerDependencies")]
    pub peer_dependencies: FxHashMap<String, String>,
}

impl PackageManifest {
    /// Whether a package appears in any dependency table.
    pub fn declares(&self, package: &str) -> bool {
        self.dependencies.contains_key(package)
            || self.dev_dependencies.contains_key(package)
            || self.peer_dependencies.contains_key(package)
    }
}

/// Immutable project context plus a small read-through content cache.
pub struct ProjectContext {
    pub root: PathBuf,
    pub truthpack: Truthpack,
    pub package_json: Option<PackageManifest>,
    file_index: FxHashSet<String>,
    content_cache: Mutex<FxHashMap<String, Option<String>>>,
}

impl ProjectContext {
    /// Build the context: truthpack, package.json, and the file index.
    pub fn load(root: &Path) -> Self {
        let truthpack = TruthpackStore::for_project(root).load();
        let package_json = std::fs::read(root.join("package.json"))
            .ok()
            .and_then(|raw| serde_json::from_slice(&raw).ok());

        let cancelled = AtomicBool::new(false);
        let file_index = walker::walk_directory(root, &ScanConfig::default(), &cancelled)
            .map(|files| files.into_iter().map(|f| f.rel_path).collect())
            .unwrap_or_default();

        Self {
            root: root.to_path_buf(),
            truthpack,
            package_json,
            file_index,
            content_cache: Mutex::new(FxHashMap::default()),
        }
    }

    /// Relative paths of every indexed file.
    pub fn files(&self) -> &FxHashSet<String> {
        &self.file_index
    }

    pub fn file_exists(&self, rel_path: &str) -> bool {
        self.file_index.contains(rel_path) || self.root.join(rel_path).exists()
    }

    /// Read a file's content through the cache. `None` for unreadable or
    /// binary files.
    pub fn read(&self, rel_path: &str) -> Option<String> {
        let mut cache = self.content_cache.lock().expect("content cache lock");
        if let Some(cached) = cache.get(rel_path) {
            return cached.clone();
        }
        let content = std::fs::read_to_string(self.root.join(rel_path)).ok();
        cache.insert(rel_path.to_string(), content.clone());
        content
    }

    /// Iterate source files (ts/tsx/js/jsx) lazily by index order.
    pub fn source_files(&self) -> Vec<String> {
        let mut sources: Vec<String> = self
            .file_index
            .iter()
            .filter(|p| {
                let ext = p.rsplit('.').next().unwrap_or("");
                matches!(ext, "ts" | "tsx" | "js" | "jsx" | "mjs" | "cjs")
            })
            .cloned()
            .collect();
        sources.sort();
        sources
    }
}
