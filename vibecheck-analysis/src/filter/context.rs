//! File-context classification and severity adjustment.

use vibecheck_core::types::context::FileContext;
use vibecheck_core::types::finding::Severity;

const CODE_EXTENSIONS: &[&str] = &[
    "ts", "tsx", "js", "jsx", "mjs", "cjs", "mts", "cts", "vue", "svelte",
];

const PRODUCTION_DIRS: &[&str] = &[
    "src/", "app/", "lib/", "server/", "api/", "pages/", "components/", "routes/", "services/",
];

/// Assign exactly one context to a relative path.
pub fn classify_path(rel_path: &str) -> FileContext {
    let path = rel_path.replace('\\', "/").to_ascii_lowercase();
    let file_name = path.rsplit('/').next().unwrap_or(&path).to_string();
    let extension = file_name.rsplit('.').next().unwrap_or("").to_string();

    if path.contains("__tests__")
        || path.contains("__test__")
        || path.contains(".test.")
        || path.contains(".spec.")
        || path.contains("/test/")
        || path.contains("/tests/")
        || path.starts_with("test/")
        || path.starts_with("tests/")
        || path.contains("/cypress/")
        || path.contains("/e2e/")
    {
        return FileContext::Test;
    }

    if path.contains("/examples/")
        || path.contains("/example/")
        || path.starts_with("examples/")
        || path.starts_with("example/")
        || path.contains("/demo/")
        || path.contains("/demos/")
        || path.contains("/samples/")
        || path.contains("/fixtures/")
        || path.starts_with("fixtures/")
        || file_name.contains(".example.")
    {
        return FileContext::Example;
    }

    if matches!(extension.as_str(), "md" | "mdx" | "rst" | "txt")
        || path.contains("/docs/")
        || path.starts_with("docs/")
        || file_name.starts_with("readme")
        || file_name.starts_with("changelog")
    {
        return FileContext::Documentation;
    }

    if file_name.contains(".config.")
        || file_name.starts_with(".env")
        || file_name.starts_with('.') && file_name.ends_with("rc")
        || matches!(extension.as_str(), "json" | "yaml" | "yml" | "toml" | "ini")
        || path.starts_with("config/")
        || path.contains("/config/")
        || file_name.contains("config")
    {
        return FileContext::Configuration;
    }

    if path.starts_with("scripts/")
        || path.contains("/scripts/")
        || path.contains("/tools/")
        || file_name.contains(".dev.")
    {
        return FileContext::Development;
    }

    // Any remaining source file counts as production; the explicit dir
    // list exists for callers that classify non-code assets under src/.
    if CODE_EXTENSIONS.contains(&extension.as_str())
        || PRODUCTION_DIRS
            .iter()
            .any(|dir| path.starts_with(dir) || path.contains(&format!("/{dir}")))
    {
        return FileContext::Production;
    }

    FileContext::Unknown
}

/// Severity adjustment table:
/// example/test downgrade one step unless entropy ≥ 5.0; documentation
/// downgrades two; production upgrades medium to high when entropy ≥ 4.5.
pub fn adjust_severity(context: FileContext, severity: Severity, entropy: f64) -> Severity {
    match context {
        FileContext::Example | FileContext::Test => {
            if entropy >= 5.0 {
                severity
            } else {
                severity.downgrade()
            }
        }
        FileContext::Documentation => severity.downgrade().downgrade(),
        FileContext::Production => {
            if entropy >= 4.5 && severity == Severity::Medium {
                Severity::High
            } else {
                severity
            }
        }
        _ => severity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_covers_the_seven_contexts() {
        assert_eq!(classify_path("src/__tests__/config.test.ts"), FileContext::Test);
        assert_eq!(classify_path("examples/demo.ts"), FileContext::Example);
        assert_eq!(classify_path("docs/guide.md"), FileContext::Documentation);
        assert_eq!(classify_path("next.config.js"), FileContext::Configuration);
        assert_eq!(classify_path(".env.local"), FileContext::Configuration);
        assert_eq!(classify_path("scripts/seed.ts"), FileContext::Development);
        assert_eq!(classify_path("src/server/index.ts"), FileContext::Production);
        assert_eq!(classify_path("assets/logo.png"), FileContext::Unknown);
    }

    #[test]
    fn adjustment_table() {
        use Severity::*;
        // example/test: one step down unless entropy >= 5.0
        assert_eq!(adjust_severity(FileContext::Test, High, 3.0), Medium);
        assert_eq!(adjust_severity(FileContext::Test, High, 5.0), High);
        assert_eq!(adjust_severity(FileContext::Example, Low, 0.0), Low);
        // documentation: two steps down
        assert_eq!(adjust_severity(FileContext::Documentation, Critical, 4.0), Medium);
        assert_eq!(adjust_severity(FileContext::Documentation, Medium, 0.0), Low);
        // production: medium upgrades at high entropy
        assert_eq!(adjust_severity(FileContext::Production, Medium, 4.5), High);
        assert_eq!(adjust_severity(FileContext::Production, Medium, 4.0), Medium);
        assert_eq!(adjust_severity(FileContext::Production, Low, 5.0), Low);
        // neutral contexts
        assert_eq!(adjust_severity(FileContext::Configuration, Critical, 0.0), Critical);
        assert_eq!(adjust_severity(FileContext::Unknown, High, 0.0), High);
    }
}
