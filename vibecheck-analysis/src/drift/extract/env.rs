//! Environment variable extraction: every `process.env.X` use, classified
//! as required or optional with an inferred type tag, plus definitions
//! harvested from `.env*` files.

use std::sync::OnceLock;

use regex::Regex;

use vibecheck_core::types::truthpack::{EnvTypeTag, EnvVarRecord};
use vibecheck_core::{FxHashMap, FxHashSet};

use crate::drift::source::SourceFile;

/// One observed use of an environment variable.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvUsage {
    pub name: String,
    /// No `??`/`||` fallback on the same line.
    pub required: bool,
    pub inferred: EnvTypeTag,
    pub location: String,
}

fn usage_regexes() -> &'static [Regex] {
    static REGEXES: OnceLock<Vec<Regex>> = OnceLock::new();
    REGEXES.get_or_init(|| {
        [
            r"process\.env\.([A-Z_][A-Z0-9_]*)",
            r#"process\.env\[['"]([A-Z_][A-Z0-9_]*)['"]\]"#,
        ]
        .iter()
        .map(|p| Regex::new(p).expect("env usage regex compiles"))
        .collect()
    })
}

fn definition_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?:export\s+)?([A-Z_][A-Z0-9_]*)\s*=").unwrap())
}

/// Infer a type tag from the use site and the variable name, first match
/// wins: `parseInt`/`Number(` → number, `=== 'true'` → boolean,
/// URL/ENDPOINT in the name → url, SECRET/KEY/TOKEN in the name → secret.
fn infer_type(name: &str, line: &str) -> EnvTypeTag {
    if line.contains("parseInt") || line.contains("Number(") {
        return EnvTypeTag::Number;
    }
    if line.contains("=== 'true'") || line.contains("=== \"true\"") {
        return EnvTypeTag::Boolean;
    }
    if name.contains("URL") || name.contains("ENDPOINT") {
        return EnvTypeTag::Url;
    }
    if name.contains("SECRET") || name.contains("KEY") || name.contains("TOKEN") {
        return EnvTypeTag::Secret;
    }
    EnvTypeTag::String
}

/// Extract every env use from code sources (`.env*` files are skipped
/// here; they are definitions, not uses). One usage per variable, merged
/// across occurrences: required if any occurrence lacks a fallback, type
/// from the first occurrence.
pub fn extract_env_usage(sources: &[SourceFile]) -> Vec<EnvUsage> {
    let mut merged: FxHashMap<String, EnvUsage> = FxHashMap::default();

    for source in sources {
        let file_name = source.rel_path.rsplit('/').next().unwrap_or("");
        if file_name.starts_with(".env") {
            continue;
        }
        for (line_no, line) in source.content.lines().enumerate() {
            for regex in usage_regexes() {
                for captures in regex.captures_iter(line) {
                    let name = captures[1].to_string();
                    let after = &line[captures.get(0).map(|m| m.end()).unwrap_or(0)..];
                    let required = !after.contains("??") && !after.contains("||");
                    let entry = merged.entry(name.clone()).or_insert_with(|| EnvUsage {
                        inferred: infer_type(&name, line),
                        name,
                        required: false,
                        location: format!("{}:{}", source.rel_path, line_no + 1),
                    });
                    entry.required |= required;
                }
            }
        }
    }

    let mut usages: Vec<EnvUsage> = merged.into_values().collect();
    usages.sort_by(|a, b| a.name.cmp(&b.name));
    usages
}

/// Harvest variable names declared in any `.env*` file.
pub fn extract_env_definitions(sources: &[SourceFile]) -> FxHashSet<String> {
    let mut defined = FxHashSet::default();
    for source in sources {
        let file_name = source.rel_path.rsplit('/').next().unwrap_or("");
        if !file_name.starts_with(".env") {
            continue;
        }
        for line in source.content.lines() {
            let trimmed = line.trim();
            if trimmed.starts_with('#') {
                continue;
            }
            if let Some(captures) = definition_regex().captures(trimmed) {
                defined.insert(captures[1].to_string());
            }
        }
    }
    defined
}

/// Usage records in truthpack form (for `scan`'s truthpack refresh).
pub fn extract_env_records(sources: &[SourceFile]) -> Vec<EnvVarRecord> {
    extract_env_usage(sources)
        .into_iter()
        .map(|usage| EnvVarRecord {
            name: usage.name,
            type_tag: usage.inferred,
            required: usage.required,
            description: None,
            default: None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(rel_path: &str, content: &str) -> SourceFile {
        SourceFile {
            rel_path: rel_path.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn required_and_optional_classification() {
        let sources = vec![source(
            "src/db.ts",
            "const url = process.env.DB_URL;\nconst region = process.env.REGION ?? 'us';\nconst zone = process.env.ZONE || 'a';\n",
        )];
        let usages = extract_env_usage(&sources);
        let by_name: FxHashMap<&str, &EnvUsage> =
            usages.iter().map(|u| (u.name.as_str(), u)).collect();
        assert!(by_name["DB_URL"].required);
        assert!(!by_name["REGION"].required);
        assert!(!by_name["ZONE"].required);
    }

    #[test]
    fn type_inference_precedence() {
        let sources = vec![source(
            "src/config.ts",
            concat!(
                "const port = parseInt(process.env.PORT, 10);\n",
                "const debug = process.env.DEBUG === 'true';\n",
                "const api = process.env.API_URL;\n",
                "const secret = process.env.SESSION_SECRET;\n",
                "const name = process.env.APP_NAME;\n",
            ),
        )];
        let usages = extract_env_usage(&sources);
        let tag = |name: &str| usages.iter().find(|u| u.name == name).unwrap().inferred;
        assert_eq!(tag("PORT"), EnvTypeTag::Number);
        assert_eq!(tag("DEBUG"), EnvTypeTag::Boolean);
        assert_eq!(tag("API_URL"), EnvTypeTag::Url);
        assert_eq!(tag("SESSION_SECRET"), EnvTypeTag::Secret);
        assert_eq!(tag("APP_NAME"), EnvTypeTag::String);
    }

    #[test]
    fn definitions_come_from_env_files_only() {
        let sources = vec![
            source(".env", "DB_URL=postgres://localhost\n# COMMENTED=1\n"),
            source(".env.local", "export SESSION_SECRET=abc\n"),
            source("src/a.ts", "const fake = 'NOT_A_DEF=1';\n"),
        ];
        let defined = extract_env_definitions(&sources);
        assert!(defined.contains("DB_URL"));
        assert!(defined.contains("SESSION_SECRET"));
        assert!(!defined.contains("COMMENTED"));
        assert_eq!(defined.len(), 2);
    }
}
