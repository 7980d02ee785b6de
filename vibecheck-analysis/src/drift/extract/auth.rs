//! Auth rule extraction: middleware matchers, guard-wrapped routes, and
//! role requirements.

use std::sync::OnceLock;

use regex::Regex;

use vibecheck_core::types::truthpack::AuthRule;
use vibecheck_core::FxHashMap;

use crate::drift::source::SourceFile;

fn guarded_route() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"\.\s*(?:get|post|put|patch|delete|all|use)\s*\(\s*['"]([^'"]+)['"]\s*,\s*(?:requireAuth|isAuthenticated|authenticate|ensureAuth|authMiddleware|withAuth|requireUser)"#,
        )
        .unwrap()
    })
}

fn role_list() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"requireRole[s]?\s*\(\s*\[([^\]]*)\]").unwrap())
}

fn matcher_array() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"matcher\s*:\s*\[([^\]]*)\]").unwrap())
}

fn matcher_single() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"matcher\s*:\s*['"]([^'"]+)['"]"#).unwrap())
}

fn quoted_strings() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"['"]([^'"]+)['"]"#).unwrap())
}

fn is_auth_source(rel_path: &str) -> bool {
    let lower = rel_path.to_ascii_lowercase();
    lower.contains("middleware") || lower.contains("guard") || lower.contains("auth")
}

/// Extract `(path, requires_auth, roles)` tuples. Rules for the same path
/// merge, unioning role sets.
pub fn extract_auth_rules(sources: &[SourceFile]) -> Vec<AuthRule> {
    let mut merged: FxHashMap<String, AuthRule> = FxHashMap::default();
    let mut upsert = |path: String, roles: Vec<String>| {
        let entry = merged.entry(path.clone()).or_insert_with(|| AuthRule {
            path,
            requires_auth: true,
            roles: Vec::new(),
        });
        for role in roles {
            if !entry.roles.contains(&role) {
                entry.roles.push(role);
            }
        }
    };

    for source in sources {
        // Next.js middleware matcher config (middleware files only).
        let file_name = source
            .rel_path
            .rsplit('/')
            .next()
            .unwrap_or(&source.rel_path)
            .to_ascii_lowercase();
        if file_name.starts_with("middleware.") {
            for captures in matcher_array().captures_iter(&source.content) {
                for path in quoted_strings().captures_iter(&captures[1]) {
                    upsert(path[1].to_string(), Vec::new());
                }
            }
            for captures in matcher_single().captures_iter(&source.content) {
                upsert(captures[1].to_string(), Vec::new());
            }
        }

        if !is_auth_source(&source.rel_path) && !source.content.contains("requireAuth") {
            continue;
        }

        for line in source.content.lines() {
            if let Some(captures) = guarded_route().captures(line) {
                let path = captures[1].to_string();
                let roles = role_list()
                    .captures(line)
                    .map(|role_captures| {
                        quoted_strings()
                            .captures_iter(&role_captures[1])
                            .map(|c| c[1].to_string())
                            .collect()
                    })
                    .unwrap_or_default();
                upsert(path, roles);
            }
        }
    }

    let mut rules: Vec<AuthRule> = merged.into_values().collect();
    for rule in &mut rules {
        rule.roles.sort();
    }
    rules.sort_by(|a, b| a.path.cmp(&b.path));
    rules
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
    fn guarded_routes_and_roles() {
        let sources = vec![source(
            "src/routes/admin.ts",
            concat!(
                "router.get('/admin', requireAuth, requireRole(['admin']), handler);\n",
                "router.post('/admin/users', requireAuth, requireRole(['admin', 'ops']), create);\n",
                "router.get('/public', handler);\n",
            ),
        )];
        let rules = extract_auth_rules(&sources);
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].path, "/admin");
        assert!(rules[0].requires_auth);
        assert_eq!(rules[0].roles, vec!["admin"]);
        assert_eq!(rules[1].roles, vec!["admin", "ops"]);
    }

    #[test]
    fn next_middleware_matcher() {
        let sources = vec![source(
            "middleware.ts",
            "export const config = { matcher: ['/dashboard/:path*', '/settings'] };\n",
        )];
        let rules = extract_auth_rules(&sources);
        assert_eq!(rules.len(), 2);
        assert!(rules.iter().all(|r| r.requires_auth));
        assert!(rules.iter().any(|r| r.path == "/settings"));
    }
}
