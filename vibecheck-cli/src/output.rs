//! The JSON Command Result object emitted by every verb in `--json` mode.

use serde::Serialize;
use serde_json::Value;

use vibecheck_core::errors::error_code::VibeErrorCode;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseEntry {
    pub name: String,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerdictEntry {
    pub status: String,
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEntry {
    pub code: String,
    pub message: String,
    pub suggestions: Vec<String>,
}

impl ErrorEntry {
    pub fn from_error<E: VibeErrorCode + std::fmt::Display>(error: &E) -> Self {
        Self {
            code: error.error_code().to_string(),
            message: error.to_string(),
            suggestions: error.suggestions(),
        }
    }
}

/// The envelope for `--json` output.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResult {
    pub command_name: String,
    pub repo_root: String,
    /// ISO-8601.
    pub started_at: String,
    pub duration_ms: u64,
    pub phases: Vec<PhaseEntry>,
    pub inputs: Value,
    pub counts: Value,
    pub scores: Value,
    pub verdict: VerdictEntry,
    pub artifacts: Value,
    pub warnings: Vec<String>,
    pub errors: Vec<ErrorEntry>,
    pub data: Value,
}

impl CommandResult {
    /// Fresh envelope stamped with the current time.
    pub fn new(command_name: &str, repo_root: &str) -> Self {
        Self {
            command_name: command_name.to_string(),
            repo_root: repo_root.to_string(),
            started_at: chrono::Utc::now().to_rfc3339(),
            duration_ms: 0,
            phases: Vec::new(),
            inputs: Value::Null,
            counts: Value::Null,
            scores: Value::Null,
            verdict: VerdictEntry {
                status: "ok".to_string(),
                reasons: Vec::new(),
            },
            artifacts: Value::Null,
            warnings: Vec::new(),
            errors: Vec::new(),
            data: Value::Null,
        }
    }

    pub fn emit(&self) {
        match serde_json::to_string_pretty(self) {
            Ok(body) => println!("{body}"),
            Err(e) => eprintln!("failed to serialize command result: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_uses_camel_case_and_iso_timestamps() {
        let mut result = CommandResult::new("scan", "/repo");
        result.duration_ms = 42;
        result.phases.push(PhaseEntry {
            name: "walk".into(),
            duration_ms: 7,
        });
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"commandName\":\"scan\""));
        assert!(json.contains("\"repoRoot\":\"/repo\""));
        assert!(json.contains("\"durationMs\":42"));
        assert!(json.contains("\"startedAt\""));
        // RFC 3339 timestamps parse back.
        assert!(chrono::DateTime::parse_from_rfc3339(&result.started_at).is_ok());
    }
}
