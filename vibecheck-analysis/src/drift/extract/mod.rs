//! Live-code extraction: routes, env vars, auth rules, type contracts.

pub mod auth;
pub mod env;
pub mod routes;
pub mod types;

use std::path::Path;

use vibecheck_core::errors::DriftError;
use vibecheck_core::types::truthpack::{
    AuthFile, ContractEndpoint, ContractsFile, EnvFile, RoutesFile, Truthpack,
};

use super::source::{collect_sources, SourceFile};

/// Extract a fresh truthpack from the live tree. Used by `scan` to write
/// the canonical snapshot and by tests to build fixtures.
pub fn extract_truthpack(root: &Path, max_file_bytes: u64) -> Result<Truthpack, DriftError> {
    let sources = collect_sources(root, max_file_bytes)?;
    Ok(extract_truthpack_from_sources(&sources))
}

/// Extraction over pre-collected sources.
pub fn extract_truthpack_from_sources(sources: &[SourceFile]) -> Truthpack {
    let route_records = routes::extract_routes(sources);
    let endpoints = route_records
        .iter()
        .filter(|r| r.path.starts_with("/api") || r.method != "GET")
        .map(|r| ContractEndpoint {
            method: r.method.clone(),
            path: r.path.clone(),
            request_type: None,
            response_type: "unknown".to_string(),
        })
        .collect();

    Truthpack {
        routes: RoutesFile {
            routes: route_records,
            ..Default::default()
        },
        env: EnvFile {
            variables: env::extract_env_records(sources),
            ..Default::default()
        },
        auth: AuthFile {
            rules: auth::extract_auth_rules(sources),
            ..Default::default()
        },
        contracts: ContractsFile {
            endpoints,
            types: types::extract_types(sources),
            ..Default::default()
        },
    }
}
