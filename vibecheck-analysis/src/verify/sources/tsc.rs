//! TypeScript declaration evidence: resolve type references and imports
//! against the project's declaration surface (`.d.ts`, `@types`).

use vibecheck_core::types::claim::{Claim, ClaimType, Evidence, EvidenceSource};

use crate::verify::context::ProjectContext;

use super::{package_name, timed_evidence, EvidenceCollector};

pub struct TypescriptCollector;

impl EvidenceCollector for TypescriptCollector {
    fn source(&self) -> EvidenceSource {
        EvidenceSource::TypescriptCompiler
    }

    fn supports(&self, claim_type: ClaimType) -> bool {
        matches!(claim_type, ClaimType::TypeReference | ClaimType::Import)
    }

    fn collect(&self, claim: &Claim, ctx: &ProjectContext) -> Evidence {
        timed_evidence(self.source(), || {
            if !ctx.file_exists("tsconfig.json") {
                return (
                    false,
                    0.0,
                    "project has no tsconfig.json".to_string(),
                    Some("typescript not configured".to_string()),
                );
            }
            match claim.claim_type {
                ClaimType::TypeReference => {
                    let pattern = match regex::Regex::new(&format!(
                        r"\b(?:interface|type|class|declare\s+(?:interface|type|class))\s+{}\b",
                        regex::escape(&claim.value)
                    )) {
                        Ok(pattern) => pattern,
                        Err(_) => {
                            return (false, 0.0, "invalid type name".to_string(), None)
                        }
                    };
                    let declared = ctx
                        .files()
                        .iter()
                        .filter(|p| p.ends_with(".d.ts") || p.ends_with(".ts") || p.ends_with(".tsx"))
                        .take(2000)
                        .any(|p| {
                            ctx.read(p)
                                .map(|content| pattern.is_match(&content))
                                .unwrap_or(false)
                        });
                    if declared {
                        (true, 0.9, format!("type {} is declared", claim.value), None)
                    } else {
                        (
                            false,
                            0.75,
                            format!("no declaration of {} in the type surface", claim.value),
                            None,
                        )
                    }
                }
                ClaimType::Import => {
                    let Some(package) = package_name(&claim.value) else {
                        return (false, 0.0, "relative import".to_string(), None);
                    };
                    let types_dir = ctx
                        .root
                        .join("node_modules/@types")
                        .join(package.trim_start_matches('@').replace('/', "__"));
                    let own_types = ctx.root.join("node_modules").join(&package).is_dir();
                    if own_types || types_dir.is_dir() {
                        (true, 0.85, format!("{package} has a type surface"), None)
                    } else {
                        (
                            false,
                            0.7,
                            format!("{package} has no resolvable declarations"),
                            None,
                        )
                    }
                }
                _ => (false, 0.0, "unsupported claim type".to_string(), None),
            }
        })
    }
}
