//! The drift detector: four sub-detectors (route, env, auth, type) run
//! concurrently under a total wall-clock ceiling, each diffing a fresh
//! codebase view against the truthpack.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::unbounded;

use vibecheck_core::config::DriftConfig;
use vibecheck_core::errors::DriftError;
use vibecheck_core::types::drift::{
    DriftCategory, DriftChangeType, DriftItem, DriftReport, DriftSummary,
};
use vibecheck_core::types::finding::Severity;
use vibecheck_core::types::truthpack::Truthpack;
use vibecheck_core::{CancellationToken, FxHashMap, FxHashSet};

use super::extract::{auth, env, routes, types};
use super::source::{collect_sources, SourceFile};

pub struct DriftDetector {
    config: DriftConfig,
}

impl DriftDetector {
    pub fn new(config: DriftConfig) -> Self {
        Self { config }
    }

    /// Run all four sub-detectors against the tree rooted at `root`.
    ///
    /// Sub-detectors that miss the deadline are skipped with a
    /// recommendation entry; partial results are still a valid report.
    pub fn detect(
        &self,
        root: &Path,
        truthpack: &Truthpack,
        cancel: &CancellationToken,
    ) -> Result<DriftReport, DriftError> {
        let start = Instant::now();
        let deadline = start + Duration::from_millis(self.config.effective_total_timeout_ms());

        let sources = Arc::new(collect_sources(root, self.config.effective_max_file_bytes())?);
        let (tx, rx) = unbounded::<(&'static str, Vec<DriftItem>)>();

        let sub_detectors: Vec<(
            &'static str,
            Box<dyn FnOnce(&[SourceFile], &Truthpack) -> Vec<DriftItem> + Send>,
        )> = vec![
            ("route", Box::new(|s, t| diff_routes(s, t))),
            ("env", Box::new(|s, t| diff_env(s, t))),
            ("auth", Box::new(|s, t| diff_auth(s, t))),
            ("type", Box::new(|s, t| diff_types(s, t))),
        ];

        let mut handles = Vec::new();
        for (name, run) in sub_detectors {
            let tx = tx.clone();
            let sources = Arc::clone(&sources);
            let truthpack = truthpack.clone();
            let cancel = cancel.clone();
            handles.push(std::thread::spawn(move || {
                if cancel.is_cancelled() {
                    return;
                }
                let items = run(&sources, &truthpack);
                let _ = tx.send((name, items));
            }));
        }
        drop(tx);

        let mut items = Vec::new();
        let mut completed: FxHashSet<&'static str> = FxHashSet::default();
        let mut recommendations = Vec::new();
        for _ in 0..4 {
            match rx.recv_deadline(deadline) {
                Ok((name, sub_items)) => {
                    completed.insert(name);
                    items.extend(sub_items);
                }
                Err(_) => break,
            }
        }
        for name in ["route", "env", "auth", "type"] {
            if !completed.contains(name) {
                tracing::warn!(sub_detector = name, "drift sub-detector missed the deadline");
                recommendations.push(format!(
                    "{name} drift detection did not finish within the time budget; rerun with a larger drift.total_timeout_ms"
                ));
            }
        }
        for handle in handles {
            let _ = handle.join();
        }

        items.sort_by(|a, b| {
            (b.severity, &a.identifier).cmp(&(a.severity, &b.identifier))
        });
        let summary = DriftSummary::from_items(&items);
        if summary.critical_count > 0 {
            recommendations.push(format!(
                "{} critical drift item(s): re-record the truthpack or fix the code before shipping",
                summary.critical_count
            ));
        }
        if cancel.is_cancelled() {
            recommendations.push("drift detection was cancelled before completion".to_string());
        }

        Ok(DriftReport {
            items,
            summary,
            recommendations,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }
}

fn item(
    change_type: DriftChangeType,
    category: DriftCategory,
    identifier: String,
    severity: Severity,
) -> DriftItem {
    DriftItem {
        change_type,
        category,
        identifier,
        severity,
        location: None,
        truthpack_value: None,
        codebase_value: None,
    }
}

/// Route diff: code-only → added, truthpack-only → removed, same tuple
/// with a different handler fingerprint → modified.
pub fn diff_routes(sources: &[SourceFile], truthpack: &Truthpack) -> Vec<DriftItem> {
    let live = routes::extract_routes(sources);
    let live_map: FxHashMap<(String, String), &str> = live
        .iter()
        .map(|r| ((r.method.clone(), r.path.clone()), r.handler.as_str()))
        .collect();
    let pack_map: FxHashMap<(String, String), &str> = truthpack
        .routes
        .routes
        .iter()
        .map(|r| ((r.method.clone(), r.path.clone()), r.handler.as_str()))
        .collect();

    let mut items = Vec::new();
    for (key, handler) in &live_map {
        match pack_map.get(key) {
            None => items.push(item(
                DriftChangeType::Added,
                DriftCategory::Route,
                format!("{} {}", key.0, key.1),
                Severity::Medium,
            )),
            Some(recorded) if recorded != handler => {
                let mut drift = item(
                    DriftChangeType::Modified,
                    DriftCategory::Route,
                    format!("{} {}", key.0, key.1),
                    Severity::Medium,
                );
                drift.truthpack_value = Some((*recorded).to_string());
                drift.codebase_value = Some((*handler).to_string());
                items.push(drift);
            }
            Some(_) => {}
        }
    }
    for key in pack_map.keys() {
        if !live_map.contains_key(key) {
            items.push(item(
                DriftChangeType::Removed,
                DriftCategory::Route,
                format!("{} {}", key.0, key.1),
                Severity::High,
            ));
        }
    }
    items.sort_by(|a, b| a.identifier.cmp(&b.identifier));
    items
}

/// Env diff per the drift rules: undeclared-but-used is critical when
/// required; declared-but-unused is low; type disagreement is medium.
pub fn diff_env(sources: &[SourceFile], truthpack: &Truthpack) -> Vec<DriftItem> {
    let usages = env::extract_env_usage(sources);
    let defined = env::extract_env_definitions(sources);
    let pack_vars: FxHashMap<&str, &vibecheck_core::types::truthpack::EnvVarRecord> = truthpack
        .env
        .variables
        .iter()
        .map(|v| (v.name.as_str(), v))
        .collect();
    let used: FxHashSet<&str> = usages.iter().map(|u| u.name.as_str()).collect();

    let mut items = Vec::new();
    for usage in &usages {
        match pack_vars.get(usage.name.as_str()) {
            None => {
                if !defined.contains(&usage.name) {
                    let severity = if usage.required {
                        Severity::Critical
                    } else {
                        Severity::High
                    };
                    let mut drift = item(
                        DriftChangeType::Added,
                        DriftCategory::Env,
                        usage.name.clone(),
                        severity,
                    );
                    drift.location = Some(usage.location.clone());
                    items.push(drift);
                }
            }
            Some(record) => {
                if record.type_tag != usage.inferred {
                    let mut drift = item(
                        DriftChangeType::Modified,
                        DriftCategory::Env,
                        usage.name.clone(),
                        Severity::Medium,
                    );
                    drift.truthpack_value =
                        Some(serde_json::to_string(&record.type_tag).unwrap_or_default());
                    drift.codebase_value =
                        Some(serde_json::to_string(&usage.inferred).unwrap_or_default());
                    drift.location = Some(usage.location.clone());
                    items.push(drift);
                }
            }
        }
    }
    for variable in &truthpack.env.variables {
        if variable.required && !used.contains(variable.name.as_str()) {
            items.push(item(
                DriftChangeType::Removed,
                DriftCategory::Env,
                variable.name.clone(),
                Severity::Low,
            ));
        }
    }
    items.sort_by(|a, b| a.identifier.cmp(&b.identifier));
    items
}

/// Auth diff: dropped protection is critical, as is dropping any recorded
/// role requirement (even when other roles were added in the same edit);
/// purely widened role sets are medium; new protection is low, or medium
/// when it also introduces role restrictions.
pub fn diff_auth(sources: &[SourceFile], truthpack: &Truthpack) -> Vec<DriftItem> {
    let live = auth::extract_auth_rules(sources);
    let live_map: FxHashMap<&str, &vibecheck_core::types::truthpack::AuthRule> =
        live.iter().map(|r| (r.path.as_str(), r)).collect();

    let mut items = Vec::new();
    for rule in &truthpack.auth.rules {
        if !rule.requires_auth {
            continue;
        }
        match live_map.get(rule.path.as_str()) {
            None => {
                let mut drift = item(
                    DriftChangeType::Modified,
                    DriftCategory::Auth,
                    rule.path.clone(),
                    Severity::Critical,
                );
                drift.truthpack_value = Some("requiresAuth".to_string());
                drift.codebase_value = Some("unprotected".to_string());
                items.push(drift);
            }
            Some(live_rule) => {
                if !live_rule.requires_auth {
                    let mut drift = item(
                        DriftChangeType::Modified,
                        DriftCategory::Auth,
                        rule.path.clone(),
                        Severity::Critical,
                    );
                    drift.truthpack_value = Some("requiresAuth".to_string());
                    drift.codebase_value = Some("requiresAuth: false".to_string());
                    items.push(drift);
                    continue;
                }
                let pack_roles: FxHashSet<&str> =
                    rule.roles.iter().map(String::as_str).collect();
                let live_roles: FxHashSet<&str> =
                    live_rule.roles.iter().map(String::as_str).collect();
                // A recorded role missing from the code drops a
                // requirement, no matter what else was added alongside.
                let dropped = pack_roles.difference(&live_roles).count();
                let gained = live_roles.difference(&pack_roles).count();
                if dropped > 0 {
                    let mut drift = item(
                        DriftChangeType::Modified,
                        DriftCategory::Auth,
                        rule.path.clone(),
                        Severity::Critical,
                    );
                    drift.truthpack_value = Some(rule.roles.join(","));
                    drift.codebase_value = Some(live_rule.roles.join(","));
                    items.push(drift);
                } else if gained > 0 {
                    let mut drift = item(
                        DriftChangeType::Modified,
                        DriftCategory::Auth,
                        rule.path.clone(),
                        Severity::Medium,
                    );
                    drift.truthpack_value = Some(rule.roles.join(","));
                    drift.codebase_value = Some(live_rule.roles.join(","));
                    items.push(drift);
                }
            }
        }
    }
    let pack_paths: FxHashSet<&str> = truthpack
        .auth
        .rules
        .iter()
        .map(|r| r.path.as_str())
        .collect();
    for rule in &live {
        if !pack_paths.contains(rule.path.as_str()) {
            // Unconditional new protection is low; role-restricted
            // protection gates callers and lands at the medium end.
            let severity = if rule.roles.is_empty() {
                Severity::Low
            } else {
                Severity::Medium
            };
            let mut drift = item(
                DriftChangeType::Added,
                DriftCategory::Auth,
                rule.path.clone(),
                severity,
            );
            drift.codebase_value = Some(if rule.roles.is_empty() {
                "requiresAuth".to_string()
            } else {
                rule.roles.join(",")
            });
            items.push(drift);
        }
    }
    items.sort_by(|a, b| a.identifier.cmp(&b.identifier));
    items
}

/// Type diff: field removal from a declared type is high, addition low.
pub fn diff_types(sources: &[SourceFile], truthpack: &Truthpack) -> Vec<DriftItem> {
    let live = types::extract_types(sources);
    let live_map: FxHashMap<&str, &vibecheck_core::types::truthpack::ContractType> =
        live.iter().map(|t| (t.name.as_str(), t)).collect();

    let mut items = Vec::new();
    for declared in &truthpack.contracts.types {
        match live_map.get(declared.name.as_str()) {
            None => items.push(item(
                DriftChangeType::Removed,
                DriftCategory::Type,
                declared.name.clone(),
                Severity::High,
            )),
            Some(live_type) => {
                let declared_fields: FxHashSet<&str> =
                    declared.schema.iter().map(String::as_str).collect();
                let live_fields: FxHashSet<&str> =
                    live_type.schema.iter().map(String::as_str).collect();
                let removed: Vec<&str> = declared_fields
                    .difference(&live_fields)
                    .copied()
                    .collect();
                let added: Vec<&str> =
                    live_fields.difference(&declared_fields).copied().collect();
                if !removed.is_empty() {
                    let mut drift = item(
                        DriftChangeType::Modified,
                        DriftCategory::Type,
                        declared.name.clone(),
                        Severity::High,
                    );
                    let mut removed = removed;
                    removed.sort_unstable();
                    drift.truthpack_value = Some(removed.join(","));
                    items.push(drift);
                }
                if !added.is_empty() {
                    let mut drift = item(
                        DriftChangeType::Modified,
                        DriftCategory::Type,
                        declared.name.clone(),
                        Severity::Low,
                    );
                    let mut added = added;
                    added.sort_unstable();
                    drift.codebase_value = Some(added.join(","));
                    items.push(drift);
                }
            }
        }
    }
    let pack_names: FxHashSet<&str> = truthpack
        .contracts
        .types
        .iter()
        .map(|t| t.name.as_str())
        .collect();
    for live_type in &live {
        if !pack_names.contains(live_type.name.as_str()) {
            items.push(item(
                DriftChangeType::Added,
                DriftCategory::Type,
                live_type.name.clone(),
                Severity::Low,
            ));
        }
    }
    items.sort_by(|a, b| a.identifier.cmp(&b.identifier));
    items
}
