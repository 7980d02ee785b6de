//! Drift detection: extraction-vs-truthpack diffs for all four
//! categories, symmetry, and the end-to-end detector.

use vibecheck_analysis::drift::extract::extract_truthpack_from_sources;
use vibecheck_analysis::drift::{
    diff_auth, diff_env, diff_routes, diff_types, DriftDetector, SourceFile,
};
use vibecheck_core::config::DriftConfig;
use vibecheck_core::types::drift::{DriftCategory, DriftChangeType};
use vibecheck_core::types::finding::Severity;
use vibecheck_core::types::truthpack::{AuthRule, ContractType, EnvTypeTag, EnvVarRecord};
use vibecheck_core::CancellationToken;

fn source(rel_path: &str, content: &str) -> SourceFile {
    SourceFile {
        rel_path: rel_path.to_string(),
        content: content.to_string(),
    }
}

#[test]
fn detect_is_symmetric_with_no_changes() {
    let sources = vec![
        source(
            "app/users/[id]/route.ts",
            "export async function GET(req) { return Response.json(user); }\n",
        ),
        source(
            "src/db.ts",
            "const url = process.env.DB_URL;\nconst region = process.env.REGION ?? 'us';\n",
        ),
        source(
            "src/routes/admin.ts",
            "router.get('/admin', requireAuth, requireRole(['admin']), handler);\n",
        ),
        source(
            "src/types.ts",
            "export interface UserProfile {\n  id: string;\n  email: string;\n}\n",
        ),
    ];
    let truthpack = extract_truthpack_from_sources(&sources);
    assert!(diff_routes(&sources, &truthpack).is_empty());
    assert!(diff_env(&sources, &truthpack).is_empty());
    assert!(diff_auth(&sources, &truthpack).is_empty());
    assert!(diff_types(&sources, &truthpack).is_empty());
}

#[test]
fn new_post_export_is_exactly_one_added_route() {
    // Truthpack recorded when only GET existed.
    let before = vec![source(
        "app/users/[id]/route.ts",
        "export async function GET(req) {}\n",
    )];
    let truthpack = extract_truthpack_from_sources(&before);

    let after = vec![source(
        "app/users/[id]/route.ts",
        "export async function GET(req) {}\nexport async function POST(req) {}\n",
    )];
    let items = diff_routes(&after, &truthpack);
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].change_type, DriftChangeType::Added);
    assert_eq!(items[0].category, DriftCategory::Route);
    assert_eq!(items[0].identifier, "POST /users/:id");
}

#[test]
fn deleting_a_tracked_route_is_exactly_one_removed_item() {
    let before = vec![source(
        "app/health/route.ts",
        "export async function GET(req) {}\n",
    )];
    let truthpack = extract_truthpack_from_sources(&before);
    let items = diff_routes(&[], &truthpack);
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].change_type, DriftChangeType::Removed);
    assert_eq!(items[0].identifier, "GET /health");
}

#[test]
fn undeclared_required_env_is_critical_added() {
    let sources = vec![source(
        "src/db.ts",
        "export const pool = connect(process.env.DB_URL);\n",
    )];
    let truthpack = Default::default();
    let items = diff_env(&sources, &truthpack);
    assert_eq!(items.len(), 1);
    let item = &items[0];
    assert_eq!(item.category, DriftCategory::Env);
    assert_eq!(item.identifier, "DB_URL");
    assert_eq!(item.change_type, DriftChangeType::Added);
    assert_eq!(item.severity, Severity::Critical);
}

#[test]
fn env_declared_in_dotenv_is_not_drift() {
    let sources = vec![
        source("src/db.ts", "export const pool = connect(process.env.DB_URL);\n"),
        source(".env", "DB_URL=postgres://localhost/dev\n"),
    ];
    let items = diff_env(&sources, &Default::default());
    assert!(items.is_empty());
}

#[test]
fn optional_env_is_high_and_unused_required_is_low() {
    let sources = vec![source(
        "src/config.ts",
        "const zone = process.env.ZONE || 'a';\n",
    )];
    let mut truthpack = vibecheck_core::types::truthpack::Truthpack::default();
    truthpack.env.variables.push(EnvVarRecord {
        name: "RETIRED_FLAG".into(),
        type_tag: EnvTypeTag::String,
        required: true,
        description: None,
        default: None,
    });
    let items = diff_env(&sources, &truthpack);
    assert_eq!(items.len(), 2);
    let added = items.iter().find(|i| i.identifier == "ZONE").unwrap();
    assert_eq!(added.severity, Severity::High);
    let removed = items.iter().find(|i| i.identifier == "RETIRED_FLAG").unwrap();
    assert_eq!(removed.change_type, DriftChangeType::Removed);
    assert_eq!(removed.severity, Severity::Low);
}

#[test]
fn env_type_disagreement_is_medium_modified() {
    let sources = vec![source(
        "src/config.ts",
        "const port = parseInt(process.env.PORT, 10);\n",
    )];
    let mut truthpack = vibecheck_core::types::truthpack::Truthpack::default();
    truthpack.env.variables.push(EnvVarRecord {
        name: "PORT".into(),
        type_tag: EnvTypeTag::String,
        required: true,
        description: None,
        default: None,
    });
    let items = diff_env(&sources, &truthpack);
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].change_type, DriftChangeType::Modified);
    assert_eq!(items[0].severity, Severity::Medium);
}

#[test]
fn dropped_auth_protection_is_critical() {
    let mut truthpack = vibecheck_core::types::truthpack::Truthpack::default();
    truthpack.auth.rules.push(AuthRule {
        path: "/admin".into(),
        requires_auth: true,
        roles: vec![],
    });
    // No auth extraction hits in the code anymore.
    let sources = vec![source("src/routes/admin.ts", "router.get('/admin', handler);\n")];
    let items = diff_auth(&sources, &truthpack);
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].severity, Severity::Critical);
    assert_eq!(items[0].change_type, DriftChangeType::Modified);
}

#[test]
fn role_shrinkage_is_critical_and_growth_is_medium() {
    let mut truthpack = vibecheck_core::types::truthpack::Truthpack::default();
    truthpack.auth.rules.push(AuthRule {
        path: "/admin".into(),
        requires_auth: true,
        roles: vec!["admin".into(), "ops".into()],
    });

    let shrunk = vec![source(
        "src/routes/admin.ts",
        "router.get('/admin', requireAuth, requireRole(['admin']), handler);\n",
    )];
    let items = diff_auth(&shrunk, &truthpack);
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].severity, Severity::Critical);

    let grown = vec![source(
        "src/routes/admin.ts",
        "router.get('/admin', requireAuth, requireRole(['admin', 'ops', 'viewer']), handler);\n",
    )];
    let items = diff_auth(&grown, &truthpack);
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].severity, Severity::Medium);
}

#[test]
fn disjoint_role_swap_still_flags_the_dropped_role() {
    let mut truthpack = vibecheck_core::types::truthpack::Truthpack::default();
    truthpack.auth.rules.push(AuthRule {
        path: "/admin".into(),
        requires_auth: true,
        roles: vec!["admin".into(), "ops".into()],
    });
    // "ops" was dropped and "viewer" added in the same edit: neither a
    // subset nor a superset of the recorded roles, but a requirement is
    // gone all the same.
    let swapped = vec![source(
        "src/routes/admin.ts",
        "router.get('/admin', requireAuth, requireRole(['admin', 'viewer']), handler);\n",
    )];
    let items = diff_auth(&swapped, &truthpack);
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].change_type, DriftChangeType::Modified);
    assert_eq!(items[0].severity, Severity::Critical);
    assert_eq!(items[0].truthpack_value.as_deref(), Some("admin,ops"));
    assert_eq!(items[0].codebase_value.as_deref(), Some("admin,viewer"));
}

#[test]
fn new_protection_severity_scales_with_role_restrictions() {
    let truthpack = vibecheck_core::types::truthpack::Truthpack::default();
    let sources = vec![source(
        "src/routes/mixed.ts",
        concat!(
            "router.get('/reports', requireAuth, handler);\n",
            "router.get('/admin', requireAuth, requireRole(['admin']), handler);\n",
        ),
    )];
    let items = diff_auth(&sources, &truthpack);
    assert_eq!(items.len(), 2);
    let plain = items.iter().find(|i| i.identifier == "/reports").unwrap();
    assert_eq!(plain.change_type, DriftChangeType::Added);
    assert_eq!(plain.severity, Severity::Low);
    let restricted = items.iter().find(|i| i.identifier == "/admin").unwrap();
    assert_eq!(restricted.change_type, DriftChangeType::Added);
    assert_eq!(restricted.severity, Severity::Medium);
}

#[test]
fn type_field_removal_is_high_addition_is_low() {
    let mut truthpack = vibecheck_core::types::truthpack::Truthpack::default();
    truthpack.contracts.types.push(ContractType {
        name: "UserProfile".into(),
        schema: vec!["email".into(), "id".into(), "name".into()],
    });
    let sources = vec![source(
        "src/types.ts",
        "export interface UserProfile {\n  id: string;\n  email: string;\n  avatarUrl: string;\n}\n",
    )];
    let items = diff_types(&sources, &truthpack);
    assert_eq!(items.len(), 2);
    let removal = items
        .iter()
        .find(|i| i.truthpack_value.as_deref() == Some("name"))
        .unwrap();
    assert_eq!(removal.severity, Severity::High);
    let addition = items
        .iter()
        .find(|i| i.codebase_value.as_deref() == Some("avatarUrl"))
        .unwrap();
    assert_eq!(addition.severity, Severity::Low);
}

#[test]
fn detector_runs_end_to_end_over_a_tree() {
    let dir = tempfile::tempdir().unwrap();
    let write = |rel: &str, content: &str| {
        let path = dir.path().join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    };
    write(
        "app/users/[id]/route.ts",
        "export async function GET(req) {}\n",
    );
    write("src/db.ts", "const url = process.env.DB_URL;\n");

    let detector = DriftDetector::new(DriftConfig::default());
    let cancel = CancellationToken::new();
    let report = detector
        .detect(dir.path(), &Default::default(), &cancel)
        .unwrap();

    // Empty truthpack: the route and the env var both surface as added.
    assert!(report
        .items
        .iter()
        .any(|i| i.category == DriftCategory::Env && i.identifier == "DB_URL"));
    assert!(report
        .items
        .iter()
        .any(|i| i.category == DriftCategory::Route));
    assert_eq!(report.summary.total_drift, report.items.len());
    assert!(report.summary.critical_count >= 1);
}
