//! Route extraction: Next.js App Router, Next.js Pages API, and
//! Express/Fastify registrations. A route is the `(method, path)` tuple;
//! dynamic segments normalize to `:param`.

use std::sync::OnceLock;

use regex::Regex;

use vibecheck_core::types::fingerprint::content_hash;
use vibecheck_core::types::truthpack::RouteRecord;
use vibecheck_core::FxHashSet;

use crate::drift::source::SourceFile;

const HTTP_METHODS: &[&str] = &["GET", "POST", "PUT", "PATCH", "DELETE", "HEAD", "OPTIONS"];

fn app_route_file() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?:src/)?app/(.*?)(?:/)?(route|page)\.(?:ts|tsx|js|jsx)$").unwrap()
    })
}

fn pages_api_file() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?:src/)?pages/api/(.*)\.(?:ts|js)$").unwrap())
}

fn exported_method() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"export\s+(?:async\s+)?(?:function|const)\s+(GET|POST|PUT|PATCH|DELETE|HEAD|OPTIONS)\b",
        )
        .unwrap()
    })
}

fn req_method_guard() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"req\.method\s*===?\s*['"](GET|POST|PUT|PATCH|DELETE|HEAD|OPTIONS)['"]"#)
            .unwrap()
    })
}

fn framework_registration() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"\b(?:app|router|server|api|fastify)\s*\.\s*(get|post|put|patch|delete|options|head|all)\s*\(\s*['"`]([^'"`]+)['"`]"#,
        )
        .unwrap()
    })
}

/// Normalize one Next.js path segment: `[id]` → `:id`, `[...slug]` →
/// `:slug`, route groups `(group)` drop out entirely.
fn normalize_segment(segment: &str) -> Option<String> {
    if segment.starts_with('(') && segment.ends_with(')') {
        return None;
    }
    if segment.starts_with('[') && segment.ends_with(']') {
        let inner = segment[1..segment.len() - 1].trim_start_matches("...");
        return Some(format!(":{inner}"));
    }
    Some(segment.to_string())
}

fn next_path(raw: &str) -> String {
    let segments: Vec<String> = raw
        .split('/')
        .filter(|s| !s.is_empty() && *s != "index")
        .filter_map(normalize_segment)
        .collect();
    if segments.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", segments.join("/"))
    }
}

fn record(file: &str, method: &str, path: &str) -> RouteRecord {
    RouteRecord {
        method: method.to_string(),
        path: path.to_string(),
        handler: content_hash(format!("{file}:{method}:{path}").as_bytes()),
        middleware: Vec::new(),
    }
}

/// Extract every route from the collected sources, de-duplicated by
/// `(method, path)` and sorted for deterministic diffs.
pub fn extract_routes(sources: &[SourceFile]) -> Vec<RouteRecord> {
    let mut routes = Vec::new();

    for source in sources {
        // Next.js App Router
        if let Some(captures) = app_route_file().captures(&source.rel_path) {
            let path = next_path(&captures[1]);
            let kind = &captures[2];
            if kind == "page" {
                routes.push(record(&source.rel_path, "GET", &path));
            } else {
                for captures in exported_method().captures_iter(&source.content) {
                    routes.push(record(&source.rel_path, &captures[1], &path));
                }
            }
            continue;
        }

        // Next.js Pages API
        if let Some(captures) = pages_api_file().captures(&source.rel_path) {
            let path = format!("/api{}", next_path(&captures[1]));
            let mut methods: Vec<String> = req_method_guard()
                .captures_iter(&source.content)
                .map(|c| c[1].to_string())
                .collect();
            methods.sort();
            methods.dedup();
            if methods.is_empty() {
                // No method guard: the handler accepts every method.
                routes.push(record(&source.rel_path, "ALL", &path));
            } else {
                for method in methods {
                    routes.push(record(&source.rel_path, &method, &path));
                }
            }
            continue;
        }

        // Express / Fastify registrations
        for captures in framework_registration().captures_iter(&source.content) {
            let method = captures[1].to_ascii_uppercase();
            let mut path = captures[2].to_string();
            if !path.starts_with('/') {
                path.insert(0, '/');
            }
            if method == "ALL" || HTTP_METHODS.contains(&method.as_str()) {
                routes.push(record(&source.rel_path, &method, &path));
            }
        }
    }

    let mut seen: FxHashSet<(String, String)> = FxHashSet::default();
    routes.retain(|r| seen.insert((r.method.clone(), r.path.clone())));
    routes.sort_by(|a, b| (&a.path, &a.method).cmp(&(&b.path, &b.method)));
    routes
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
    fn app_router_dynamic_segments_normalize() {
        let sources = vec![source(
            "app/users/[id]/route.ts",
            "export async function GET(req) {}\nexport async function POST(req) {}\n",
        )];
        let routes = extract_routes(&sources);
        assert_eq!(routes.len(), 2);
        assert_eq!(routes[0].method, "GET");
        assert_eq!(routes[0].path, "/users/:id");
        assert_eq!(routes[1].method, "POST");
    }

    #[test]
    fn route_groups_and_catch_alls() {
        let sources = vec![source(
            "src/app/(marketing)/blog/[...slug]/page.tsx",
            "export default function Page() {}\n",
        )];
        let routes = extract_routes(&sources);
        assert_eq!(routes[0].path, "/blog/:slug");
        assert_eq!(routes[0].method, "GET");
    }

    #[test]
    fn pages_api_without_guard_is_all_methods() {
        let sources = vec![
            source("pages/api/health.ts", "export default (req, res) => res.end();\n"),
            source(
                "pages/api/users/index.ts",
                "if (req.method === 'POST') {}\nif (req.method === 'GET') {}\n",
            ),
        ];
        let routes = extract_routes(&sources);
        let tuples: Vec<(String, String)> = routes
            .iter()
            .map(|r| (r.method.clone(), r.path.clone()))
            .collect();
        assert!(tuples.contains(&("ALL".to_string(), "/api/health".to_string())));
        assert!(tuples.contains(&("GET".to_string(), "/api/users".to_string())));
        assert!(tuples.contains(&("POST".to_string(), "/api/users".to_string())));
    }

    #[test]
    fn express_registrations() {
        let sources = vec![source(
            "src/server.ts",
            "app.get('/health', handler);\nrouter.post('/users/:id/avatar', upload);\n",
        )];
        let routes = extract_routes(&sources);
        assert_eq!(routes.len(), 2);
        assert_eq!(routes[0].path, "/health");
        assert_eq!(routes[1].path, "/users/:id/avatar");
        assert_eq!(routes[1].method, "POST");
    }

    #[test]
    fn handler_fingerprint_is_tuple_scoped() {
        let a = record("app/x/route.ts", "GET", "/x");
        let b = record("app/x/route.ts", "GET", "/x");
        let c = record("app/y/route.ts", "GET", "/x");
        assert_eq!(a.handler, b.handler);
        assert_ne!(a.handler, c.handler);
    }
}
