//! Hallucination and fake-feature patterns: imports of packages that do
//! not exist, placeholder URLs, and stubbed implementations.

use vibecheck_core::types::finding::{FindingCategory as Cat, Severity as Sev};

use crate::patterns::types::{ContextPredicate as Ctx, PatternDef};

pub static PATTERNS: &[PatternDef] = &[
    // Deny-list of plausible-sounding packages that commonly appear in
    // generated code but are not published.
    PatternDef { id: "fake-package-import", category: Cat::Hallucinations, severity: Sev::Critical, regex: r#"(?:from\s+|require\s*\(\s*)['"]((?:json-schema-validator-pro|react-auth-simple|express-security-middleware|node-crypto-utils|ts-validation-helper|auto-api-client|smart-config-loader|universal-db-connector|quick-jwt-auth|easy-stripe-integration|react-hooks-helper-pro|next-auth-lite)(?:/[^'"]*)?)['"]"#, capture: 1, min_entropy: 0.0, exclude_in_tests: false, live_credential: false, context: Ctx::None, default_fix: Some("verify the package exists on the registry before importing"), confidence_base: 90 },
    PatternDef { id: "placeholder-url", category: Cat::FakeFeatures, severity: Sev::Medium, regex: r#"['"](https?://(?:www\.)?(?:example\.(?:com|org|net)|your-[a-z0-9\-]+\.com|yourdomain\.com|placeholder\.com|api\.example\.[a-z]+)[^'"]*)['"]"#, capture: 1, min_entropy: 0.0, exclude_in_tests: true, live_credential: false, context: Ctx::None, default_fix: Some("replace the placeholder with the real endpoint"), confidence_base: 85 },
    PatternDef { id: "localhost-url", category: Cat::FakeFeatures, severity: Sev::Low, regex: r#"['"](https?://(?:localhost|127\.0\.0\.1)(?::\d+)?[^'"]*)['"]"#, capture: 1, min_entropy: 0.0, exclude_in_tests: true, live_credential: false, context: Ctx::None, default_fix: Some("read the base URL from configuration"), confidence_base: 70 },
    PatternDef { id: "not-implemented-throw", category: Cat::FakeFeatures, severity: Sev::High, regex: r#"(?i)throw\s+new\s+Error\s*\(\s*['"`](?:not (?:yet )?implemented|unimplemented|todo)"#, capture: 0, min_entropy: 0.0, exclude_in_tests: true, live_credential: false, context: Ctx::None, default_fix: Some("implement the function or remove the dead entry point"), confidence_base: 90 },
    PatternDef { id: "stub-return-todo", category: Cat::FakeFeatures, severity: Sev::High, regex: r"return\s+(?:true|false|null|undefined|\[\]|\{\})\s*;?\s*//\s*(?i:todo|stub|implement|fixme|placeholder)", capture: 0, min_entropy: 0.0, exclude_in_tests: true, live_credential: false, context: Ctx::None, default_fix: Some("replace the stubbed return with the real result"), confidence_base: 90 },
    PatternDef { id: "always-true-validation", category: Cat::FakeFeatures, severity: Sev::High, regex: r"(?i)function\s+(?:validate|check|verify|authorize|authenticate)\w*\s*\([^)]*\)[^{]*\{\s*return\s+true\s*;?\s*\}", capture: 0, min_entropy: 0.0, exclude_in_tests: true, live_credential: false, context: Ctx::None, default_fix: Some("implement the validation body"), confidence_base: 85 },
];
