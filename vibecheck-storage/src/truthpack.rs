//! Truthpack store: four JSON records under `.vibecheck/truthpack/`.
//!
//! Reads are best-effort — a missing or invalid file yields an empty
//! versioned record. Writes are atomic.

use std::path::{Path, PathBuf};

use vibecheck_core::types::truthpack::{
    AuthFile, ContractsFile, EnvFile, RoutesFile, Truthpack,
};

use crate::json::{read_json_or_default, write_json_atomic};
use crate::paths;

/// Handle on a project's truthpack directory.
#[derive(Debug, Clone)]
pub struct TruthpackStore {
    dir: PathBuf,
}

impl TruthpackStore {
    /// Store rooted at `<project>/.vibecheck/truthpack/`.
    pub fn for_project(project_root: &Path) -> Self {
        Self {
            dir: paths::truthpack_dir(project_root),
        }
    }

    /// Store at an explicit directory (tests, alternate layouts).
    pub fn at(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn read_routes(&self) -> RoutesFile {
        read_json_or_default(&self.dir.join("routes.json"))
    }

    pub fn read_env(&self) -> EnvFile {
        read_json_or_default(&self.dir.join("env.json"))
    }

    pub fn read_auth(&self) -> AuthFile {
        read_json_or_default(&self.dir.join("auth.json"))
    }

    pub fn read_contracts(&self) -> ContractsFile {
        read_json_or_default(&self.dir.join("contracts.json"))
    }

    pub fn write_routes(&self, routes: &RoutesFile) -> std::io::Result<()> {
        write_json_atomic(&self.dir.join("routes.json"), routes)
    }

    pub fn write_env(&self, env: &EnvFile) -> std::io::Result<()> {
        write_json_atomic(&self.dir.join("env.json"), env)
    }

    pub fn write_auth(&self, auth: &AuthFile) -> std::io::Result<()> {
        write_json_atomic(&self.dir.join("auth.json"), auth)
    }

    pub fn write_contracts(&self, contracts: &ContractsFile) -> std::io::Result<()> {
        write_json_atomic(&self.dir.join("contracts.json"), contracts)
    }

    /// Load all four records.
    pub fn load(&self) -> Truthpack {
        Truthpack {
            routes: self.read_routes(),
            env: self.read_env(),
            auth: self.read_auth(),
            contracts: self.read_contracts(),
        }
    }

    /// Persist all four records.
    pub fn save(&self, pack: &Truthpack) -> std::io::Result<()> {
        self.write_routes(&pack.routes)?;
        self.write_env(&pack.env)?;
        self.write_auth(&pack.auth)?;
        self.write_contracts(&pack.contracts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vibecheck_core::types::truthpack::RouteRecord;

    #[test]
    fn missing_files_yield_empty_records() {
        let dir = tempfile::tempdir().unwrap();
        let store = TruthpackStore::for_project(dir.path());
        let pack = store.load();
        assert!(pack.is_empty());
    }

    #[test]
    fn invalid_json_yields_empty_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = TruthpackStore::for_project(dir.path());
        std::fs::create_dir_all(paths::truthpack_dir(dir.path())).unwrap();
        std::fs::write(
            paths::truthpack_dir(dir.path()).join("routes.json"),
            b"{not json",
        )
        .unwrap();
        assert!(store.read_routes().routes.is_empty());
    }

    #[test]
    fn save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = TruthpackStore::for_project(dir.path());
        let mut pack = Truthpack::default();
        pack.routes.routes.push(RouteRecord {
            method: "GET".into(),
            path: "/users/:id".into(),
            handler: "deadbeefdeadbeef".into(),
            middleware: vec![],
        });
        store.save(&pack).unwrap();
        assert_eq!(store.load(), pack);
    }
}
