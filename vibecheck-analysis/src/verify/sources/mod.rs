//! Evidence collectors, one per source. Each is cheap to construct and
//! panic-isolated by the verifier.

mod ast;
mod filesystem;
mod git;
mod package_json;
mod runtime;
mod truthpack;
mod tsc;

use std::time::Instant;

use vibecheck_core::types::claim::{Claim, ClaimType, Evidence, EvidenceSource};

use super::context::ProjectContext;

pub use ast::AstCollector;
pub use filesystem::FilesystemCollector;
pub use git::GitCollector;
pub use package_json::PackageJsonCollector;
pub use runtime::RuntimeCollector;
pub use truthpack::TruthpackCollector;
pub use tsc::TypescriptCollector;

/// One evidence source.
pub trait EvidenceCollector: Send + Sync {
    fn source(&self) -> EvidenceSource;

    /// Which claim types this source can speak to.
    fn supports(&self, claim_type: ClaimType) -> bool;

    fn collect(&self, claim: &Claim, ctx: &ProjectContext) -> Evidence;
}

/// Build the collector for one source.
pub fn collector_for(source: EvidenceSource) -> Box<dyn EvidenceCollector> {
    match source {
        EvidenceSource::Truthpack => Box::new(TruthpackCollector),
        EvidenceSource::Ast => Box::new(AstCollector),
        EvidenceSource::Filesystem => Box::new(FilesystemCollector),
        EvidenceSource::Git => Box::new(GitCollector),
        EvidenceSource::PackageJson => Box::new(PackageJsonCollector),
        EvidenceSource::TypescriptCompiler => Box::new(TypescriptCollector),
        EvidenceSource::Runtime => Box::new(RuntimeCollector),
    }
}

/// Run a check body and wrap it as timed [`Evidence`].
pub(crate) fn timed_evidence<F>(source: EvidenceSource, body: F) -> Evidence
where
    F: FnOnce() -> (bool, f64, String, Option<String>),
{
    let start = Instant::now();
    let (verified, confidence, details, error) = body();
    Evidence {
        source,
        verified,
        confidence,
        details,
        duration_ms: start.elapsed().as_millis() as u64,
        error,
    }
}

/// Package name of an import specifier: `@scope/name/sub` → `@scope/name`,
/// `pkg/sub` → `pkg`. Relative specifiers return `None`.
pub(crate) fn package_name(spec: &str) -> Option<String> {
    if spec.starts_with('.') || spec.starts_with('/') {
        return None;
    }
    let mut parts = spec.split('/');
    let first = parts.next()?;
    if first.starts_with('@') {
        let second = parts.next()?;
        Some(format!("{first}/{second}"))
    } else {
        Some(first.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn package_names() {
        assert_eq!(package_name("react"), Some("react".to_string()));
        assert_eq!(package_name("react-dom/client"), Some("react-dom".to_string()));
        assert_eq!(
            package_name("@scope/pkg/deep/path"),
            Some("@scope/pkg".to_string())
        );
        assert_eq!(package_name("./local"), None);
    }
}
