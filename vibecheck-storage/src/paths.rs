//! On-disk layout under `<project>/.vibecheck/`.

use std::path::{Path, PathBuf};

/// Name of the workspace directory.
pub const VIBECHECK_DIR: &str = ".vibecheck";

/// `<project>/.vibecheck/`
pub fn vibecheck_dir(project_root: &Path) -> PathBuf {
    project_root.join(VIBECHECK_DIR)
}

/// `<project>/.vibecheck/truthpack/`
pub fn truthpack_dir(project_root: &Path) -> PathBuf {
    vibecheck_dir(project_root).join("truthpack")
}

/// `<project>/.vibecheck/cache/`
pub fn cache_dir(project_root: &Path) -> PathBuf {
    vibecheck_dir(project_root).join("cache")
}

/// `<project>/.vibecheck/incremental-state.json`
pub fn state_path(project_root: &Path) -> PathBuf {
    vibecheck_dir(project_root).join("incremental-state.json")
}

/// `<project>/.vibecheck/calibration.json`
pub fn calibration_path(project_root: &Path) -> PathBuf {
    vibecheck_dir(project_root).join("calibration.json")
}

/// `<project>/.vibecheck/secrets.allowlist`
pub fn allowlist_path(project_root: &Path) -> PathBuf {
    vibecheck_dir(project_root).join("secrets.allowlist")
}

/// `<project>/.vibecheck/fixes/`
pub fn fixes_dir(project_root: &Path) -> PathBuf {
    vibecheck_dir(project_root).join("fixes")
}
