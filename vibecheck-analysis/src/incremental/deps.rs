//! Relative-import extraction and resolution for the dependency graph.

use std::sync::OnceLock;

use regex::Regex;

use vibecheck_core::FxHashSet;

/// Extension-try order when resolving an import specifier.
pub const EXTENSION_TRY_ORDER: &[&str] = &[
    "",
    ".ts",
    ".tsx",
    ".js",
    ".jsx",
    "/index.ts",
    "/index.tsx",
    "/index.js",
    "/index.jsx",
];

fn import_regexes() -> &'static [Regex] {
    static REGEXES: OnceLock<Vec<Regex>> = OnceLock::new();
    REGEXES.get_or_init(|| {
        [
            // import x from './y'; import './y'; import { a } from "./y"
            r#"import\s+(?:[^'";]*?from\s+)?['"](\.[^'"]+)['"]"#,
            // export * from './y'; export { a } from './y'
            r#"export\s+(?:\*|\{[^}]*\})\s*from\s+['"](\.[^'"]+)['"]"#,
            // require('./y')
            r#"require\s*\(\s*['"](\.[^'"]+)['"]\s*\)"#,
        ]
        .iter()
        .map(|p| Regex::new(p).expect("import regex compiles"))
        .collect()
    })
}

/// Extract relative import specifiers (`./`, `../`) from source text.
pub fn extract_relative_imports(content: &str) -> Vec<String> {
    let mut specs = Vec::new();
    for regex in import_regexes() {
        for captures in regex.captures_iter(content) {
            if let Some(spec) = captures.get(1) {
                specs.push(spec.as_str().to_string());
            }
        }
    }
    specs.sort();
    specs.dedup();
    specs
}

/// Normalize a `/`-joined path, resolving `.` and `..` segments.
pub fn normalize_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// Resolve an import specifier from `from_rel_path` against the known
/// file set, trying extensions in the canonical order.
pub fn resolve_import(
    from_rel_path: &str,
    spec: &str,
    files: &FxHashSet<String>,
) -> Option<String> {
    let dir = match from_rel_path.rfind('/') {
        Some(idx) => &from_rel_path[..idx],
        None => "",
    };
    let joined = if dir.is_empty() {
        spec.to_string()
    } else {
        format!("{dir}/{spec}")
    };
    let base = normalize_path(&joined);
    for ext in EXTENSION_TRY_ORDER {
        let candidate = format!("{base}{ext}");
        if files.contains(&candidate) {
            return Some(candidate);
        }
    }
    None
}
