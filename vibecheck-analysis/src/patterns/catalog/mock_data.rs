//! Mock-data patterns: sample users, filler text, hardcoded fixtures.

use vibecheck_core::types::finding::{FindingCategory as Cat, Severity as Sev};

use crate::patterns::types::{ContextPredicate as Ctx, PatternDef};

pub static PATTERNS: &[PatternDef] = &[
    PatternDef { id: "lorem-ipsum", category: Cat::MockData, severity: Sev::Low, regex: r"(?i)lorem ipsum", capture: 0, min_entropy: 0.0, exclude_in_tests: true, live_credential: false, context: Ctx::None, default_fix: Some("replace filler copy with real content"), confidence_base: 95 },
    PatternDef { id: "sample-user-email", category: Cat::MockData, severity: Sev::Low, regex: r#"(?i)['"][a-z0-9._%+\-]*(?:john\.?doe|jane\.?doe|test|demo|sample)@(?:example|test|demo|mail)\.(?:com|org|net)['"]"#, capture: 0, min_entropy: 0.0, exclude_in_tests: true, live_credential: false, context: Ctx::None, default_fix: None, confidence_base: 85 },
    PatternDef { id: "hardcoded-test-login", category: Cat::MockData, severity: Sev::Medium, regex: r#"(?i)(?:username|user|login)\s*[=:]\s*['"](?:admin|root|test|demo)['"]\s*,?\s*(?:password|pass|pwd)\s*[=:]\s*['"][^'"]+['"]"#, capture: 0, min_entropy: 0.0, exclude_in_tests: true, live_credential: false, context: Ctx::None, default_fix: Some("load test credentials from fixtures, not source"), confidence_base: 80 },
    PatternDef { id: "mock-data-array", category: Cat::MockData, severity: Sev::Low, regex: r"(?i)(?:const|let|var)\s+(?:mock|fake|dummy|sample)[A-Za-z0-9_]*\s*=\s*\[", capture: 0, min_entropy: 0.0, exclude_in_tests: true, live_credential: false, context: Ctx::None, default_fix: None, confidence_base: 75 },
    PatternDef { id: "foo-bar-fixture", category: Cat::MockData, severity: Sev::Low, regex: r#"['"]foo['"]\s*,\s*['"]bar['"]"#, capture: 0, min_entropy: 0.0, exclude_in_tests: true, live_credential: false, context: Ctx::None, default_fix: None, confidence_base: 70 },
];
