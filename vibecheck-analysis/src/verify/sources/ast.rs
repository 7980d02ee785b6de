//! AST-level evidence: harvest declarations from project sources and
//! check whether the claimed symbol, module, or type actually exists.

use std::sync::OnceLock;

use regex::Regex;

use vibecheck_core::types::claim::{Claim, ClaimType, Evidence, EvidenceSource};

use crate::incremental::deps;
use crate::verify::context::ProjectContext;

use super::{package_name, timed_evidence, EvidenceCollector};

fn function_decl(name: &str) -> Vec<Regex> {
    [
        format!(r"\bfunction\s+{}\s*\(", regex::escape(name)),
        format!(
            r"\b(?:const|let|var)\s+{}\s*=\s*(?:async\s+)?(?:function|\()",
            regex::escape(name)
        ),
        format!(r"\b{}\s*\([^)]*\)\s*\{{", regex::escape(name)),
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
}

fn type_decl(name: &str) -> Option<Regex> {
    Regex::new(&format!(
        r"\b(?:interface|type|class|enum)\s+{}\b",
        regex::escape(name)
    ))
    .ok()
}

fn import_of() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?:from\s+|require\s*\(\s*)['"]([^'"]+)['"]"#).unwrap())
}

/// Scan capped at this many files so a pathological tree cannot stall a
/// single source past its timeout.
const MAX_FILES_SCANNED: usize = 2000;

pub struct AstCollector;

impl AstCollector {
    fn search_sources<F>(&self, ctx: &ProjectContext, mut predicate: F) -> Option<String>
    where
        F: FnMut(&str) -> bool,
    {
        for rel_path in ctx.source_files().into_iter().take(MAX_FILES_SCANNED) {
            if let Some(content) = ctx.read(&rel_path) {
                if predicate(&content) {
                    return Some(rel_path);
                }
            }
        }
        None
    }
}

impl EvidenceCollector for AstCollector {
    fn source(&self) -> EvidenceSource {
        EvidenceSource::Ast
    }

    fn supports(&self, claim_type: ClaimType) -> bool {
        matches!(
            claim_type,
            ClaimType::Import | ClaimType::FunctionCall | ClaimType::TypeReference
        )
    }

    fn collect(&self, claim: &Claim, ctx: &ProjectContext) -> Evidence {
        timed_evidence(self.source(), || match claim.claim_type {
            ClaimType::Import => {
                if claim.value.starts_with('.') {
                    let from = claim
                        .location
                        .as_ref()
                        .map(|l| l.file.as_str())
                        .unwrap_or("");
                    match deps::resolve_import(from, &claim.value, ctx.files()) {
                        Some(target) => (true, 0.85, format!("module resolves to {target}"), None),
                        None => (
                            false,
                            0.8,
                            format!("{} has no resolvable target", claim.value),
                            None,
                        ),
                    }
                } else {
                    let package = package_name(&claim.value).unwrap_or_default();
                    let manifest_path = ctx
                        .root
                        .join("node_modules")
                        .join(&package)
                        .join("package.json");
                    if manifest_path.is_file() {
                        (true, 0.85, format!("{package} ships a manifest"), None)
                    } else {
                        // Fall back to whether anything else in the tree
                        // imports it (corroboration, not proof).
                        let imported_elsewhere = self
                            .search_sources(ctx, |content| {
                                import_of().captures_iter(content).any(|c| {
                                    package_name(&c[1]).as_deref() == Some(package.as_str())
                                })
                            })
                            .is_some();
                        if imported_elsewhere {
                            (
                                false,
                                0.4,
                                format!("{package} imported elsewhere but not installed"),
                                None,
                            )
                        } else {
                            (false, 0.8, format!("{package} is not installed"), None)
                        }
                    }
                }
            }
            ClaimType::FunctionCall => {
                let regexes = function_decl(&claim.value);
                let found = self.search_sources(ctx, |content| {
                    regexes.iter().any(|re| re.is_match(content))
                });
                match found {
                    Some(path) => (true, 0.85, format!("declared in {path}"), None),
                    None => (
                        false,
                        0.7,
                        format!("no declaration of {} found", claim.value),
                        None,
                    ),
                }
            }
            ClaimType::TypeReference => {
                let Some(regex) = type_decl(&claim.value) else {
                    return (false, 0.0, "invalid type name".to_string(), None);
                };
                let found = self.search_sources(ctx, |content| regex.is_match(content));
                match found {
                    Some(path) => (true, 0.85, format!("declared in {path}"), None),
                    None => (
                        false,
                        0.7,
                        format!("no declaration of {} found", claim.value),
                        None,
                    ),
                }
            }
            _ => (false, 0.0, "unsupported claim type".to_string(), None),
        })
    }
}
