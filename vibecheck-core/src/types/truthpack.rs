//! Truthpack records: the persisted canonical snapshot of a project's
//! routes, env vars, auth rules, and type contracts.
//!
//! Wire format follows the on-disk JSON layout; field names are camelCase
//! where the files use camelCase. Readers tolerate unknown fields.

use serde::{Deserialize, Serialize};

/// Current schema version written by this build.
pub const TRUTHPACK_VERSION: u32 = 1;

fn default_version() -> u32 {
    TRUTHPACK_VERSION
}

/// One HTTP route. A route is identified by the `(method, path)` tuple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRecord {
    pub method: String,
    pub path: String,
    /// Handler fingerprint: truncated SHA-256 of `"<file>:<method>:<path>"`.
    pub handler: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub middleware: Vec<String>,
}

/// `routes.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoutesFile {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub routes: Vec<RouteRecord>,
}

/// Inferred type tag for an environment variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvTypeTag {
    String,
    Number,
    Boolean,
    Url,
    Secret,
}

impl Default for EnvTypeTag {
    fn default() -> Self {
        EnvTypeTag::String
    }
}

/// One declared environment variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvVarRecord {
    pub name: String,
    #[serde(rename = "type", default)]
    pub type_tag: EnvTypeTag,
    #[serde(default)]
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

/// `env.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvFile {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub variables: Vec<EnvVarRecord>,
}

/// One auth rule: whether a path requires auth and which roles may pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthRule {
    pub path: String,
    pub requires_auth: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
}

/// `auth.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthFile {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub rules: Vec<AuthRule>,
}

/// One API endpoint contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractEndpoint {
    pub method: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_type: Option<String>,
    pub response_type: String,
}

/// One named type with its top-level field names, sorted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractType {
    pub name: String,
    #[serde(default)]
    pub schema: Vec<String>,
}

/// `contracts.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContractsFile {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub endpoints: Vec<ContractEndpoint>,
    #[serde(default)]
    pub types: Vec<ContractType>,
}

/// The four parallel records, loaded together.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Truthpack {
    #[serde(default)]
    pub routes: RoutesFile,
    #[serde(default)]
    pub env: EnvFile,
    #[serde(default)]
    pub auth: AuthFile,
    #[serde(default)]
    pub contracts: ContractsFile,
}

impl Truthpack {
    /// True when no record holds any data.
    pub fn is_empty(&self) -> bool {
        self.routes.routes.is_empty()
            && self.env.variables.is_empty()
            && self.auth.rules.is_empty()
            && self.contracts.endpoints.is_empty()
            && self.contracts.types.is_empty()
    }
}
