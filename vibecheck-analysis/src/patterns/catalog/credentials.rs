//! Credential patterns: provider keys, tokens, and connection strings.
//!
//! `live_credential` patterns are never skipped or downgraded by
//! test/example paths — a live Stripe key in a test file is still live.

use vibecheck_core::types::finding::{FindingCategory as Cat, Severity as Sev};

use crate::patterns::types::{ContextPredicate as Ctx, PatternDef};

const FIX_ENV: &str = "move the value into an environment variable and rotate the credential";
const FIX_ROTATE: &str = "rotate the credential and load it from a secrets manager";

pub static PATTERNS: &[PatternDef] = &[
    PatternDef { id: "aws-access-key-id", category: Cat::Credentials, severity: Sev::Critical, regex: r"\b((?:AKIA|ASIA)[0-9A-Z]{16})\b", capture: 1, min_entropy: 0.0, exclude_in_tests: false, live_credential: true, context: Ctx::None, default_fix: Some(FIX_ROTATE), confidence_base: 95 },
    PatternDef { id: "aws-secret-access-key", category: Cat::Credentials, severity: Sev::Critical, regex: r#"(?i)aws[_\-]?secret[_\-]?(?:access[_\-]?)?key\s*[=:]\s*['"]?([A-Za-z0-9/+=]{40})"#, capture: 1, min_entropy: 3.5, exclude_in_tests: false, live_credential: true, context: Ctx::None, default_fix: Some(FIX_ROTATE), confidence_base: 90 },
    PatternDef { id: "google-api-key", category: Cat::Credentials, severity: Sev::High, regex: r"\b(AIza[0-9A-Za-z_\-]{35})\b", capture: 1, min_entropy: 0.0, exclude_in_tests: false, live_credential: true, context: Ctx::None, default_fix: Some(FIX_ENV), confidence_base: 92 },
    PatternDef { id: "firebase-service-account", category: Cat::Credentials, severity: Sev::Critical, regex: r#""type"\s*:\s*"service_account""#, capture: 0, min_entropy: 0.0, exclude_in_tests: true, live_credential: false, context: Ctx::None, default_fix: Some("keep service-account JSON out of the repository"), confidence_base: 85 },
    PatternDef { id: "github-pat", category: Cat::Credentials, severity: Sev::Critical, regex: r"\b(ghp_[A-Za-z0-9]{36})\b", capture: 1, min_entropy: 0.0, exclude_in_tests: false, live_credential: true, context: Ctx::None, default_fix: Some(FIX_ROTATE), confidence_base: 95 },
    PatternDef { id: "github-oauth-token", category: Cat::Credentials, severity: Sev::High, regex: r"\b(gho_[A-Za-z0-9]{36})\b", capture: 1, min_entropy: 0.0, exclude_in_tests: false, live_credential: true, context: Ctx::None, default_fix: Some(FIX_ROTATE), confidence_base: 95 },
    PatternDef { id: "github-app-token", category: Cat::Credentials, severity: Sev::High, regex: r"\b(gh[us]_[A-Za-z0-9]{36})\b", capture: 1, min_entropy: 0.0, exclude_in_tests: false, live_credential: true, context: Ctx::None, default_fix: Some(FIX_ROTATE), confidence_base: 95 },
    PatternDef { id: "github-fine-grained-pat", category: Cat::Credentials, severity: Sev::Critical, regex: r"\b(github_pat_[A-Za-z0-9_]{82})\b", capture: 1, min_entropy: 0.0, exclude_in_tests: false, live_credential: true, context: Ctx::None, default_fix: Some(FIX_ROTATE), confidence_base: 95 },
    PatternDef { id: "gitlab-pat", category: Cat::Credentials, severity: Sev::Critical, regex: r"\b(glpat-[A-Za-z0-9_\-]{20})\b", capture: 1, min_entropy: 0.0, exclude_in_tests: false, live_credential: true, context: Ctx::None, default_fix: Some(FIX_ROTATE), confidence_base: 95 },
    PatternDef { id: "stripe-live-key", category: Cat::Credentials, severity: Sev::Critical, regex: r"\b(sk_live_[A-Za-z0-9]{16,})\b", capture: 1, min_entropy: 0.0, exclude_in_tests: false, live_credential: true, context: Ctx::None, default_fix: Some(FIX_ROTATE), confidence_base: 97 },
    PatternDef { id: "stripe-restricted-key", category: Cat::Credentials, severity: Sev::Critical, regex: r"\b(rk_live_[A-Za-z0-9]{16,})\b", capture: 1, min_entropy: 0.0, exclude_in_tests: false, live_credential: true, context: Ctx::None, default_fix: Some(FIX_ROTATE), confidence_base: 97 },
    PatternDef { id: "stripe-test-key", category: Cat::Credentials, severity: Sev::Low, regex: r"\b(sk_test_[A-Za-z0-9]{16,})\b", capture: 1, min_entropy: 0.0, exclude_in_tests: true, live_credential: false, context: Ctx::None, default_fix: Some(FIX_ENV), confidence_base: 90 },
    PatternDef { id: "slack-token", category: Cat::Credentials, severity: Sev::High, regex: r"\b(xox[baprs]-[A-Za-z0-9\-]{10,})\b", capture: 1, min_entropy: 0.0, exclude_in_tests: false, live_credential: true, context: Ctx::None, default_fix: Some(FIX_ROTATE), confidence_base: 92 },
    PatternDef { id: "sendgrid-api-key", category: Cat::Credentials, severity: Sev::High, regex: r"\b(SG\.[A-Za-z0-9_\-]{22}\.[A-Za-z0-9_\-]{43})\b", capture: 1, min_entropy: 0.0, exclude_in_tests: false, live_credential: true, context: Ctx::None, default_fix: Some(FIX_ROTATE), confidence_base: 95 },
    PatternDef { id: "twilio-account-sid", category: Cat::Credentials, severity: Sev::Medium, regex: r"\b(AC[0-9a-fA-F]{32})\b", capture: 1, min_entropy: 3.0, exclude_in_tests: true, live_credential: false, context: Ctx::KeywordAnyOf(&["twilio", "sid", "account"]), default_fix: Some(FIX_ENV), confidence_base: 75 },
    PatternDef { id: "twilio-auth-token", category: Cat::Credentials, severity: Sev::Critical, regex: r#"(?i)twilio[_\-]?(?:auth[_\-]?)?token\s*[=:]\s*['"]?([0-9a-f]{32})"#, capture: 1, min_entropy: 3.0, exclude_in_tests: false, live_credential: true, context: Ctx::None, default_fix: Some(FIX_ROTATE), confidence_base: 90 },
    PatternDef { id: "openai-api-key", category: Cat::Credentials, severity: Sev::Critical, regex: r"\b(sk-(?:proj-)?[A-Za-z0-9_\-]{20,}T3BlbkFJ[A-Za-z0-9_\-]{20,})\b", capture: 1, min_entropy: 0.0, exclude_in_tests: false, live_credential: true, context: Ctx::None, default_fix: Some(FIX_ROTATE), confidence_base: 95 },
    PatternDef { id: "anthropic-api-key", category: Cat::Credentials, severity: Sev::Critical, regex: r"\b(sk-ant-[A-Za-z0-9_\-]{32,})\b", capture: 1, min_entropy: 0.0, exclude_in_tests: false, live_credential: true, context: Ctx::None, default_fix: Some(FIX_ROTATE), confidence_base: 95 },
    PatternDef { id: "discord-bot-token", category: Cat::Credentials, severity: Sev::High, regex: r"\b([MN][A-Za-z0-9_\-]{23}\.[A-Za-z0-9_\-]{6}\.[A-Za-z0-9_\-]{27,})\b", capture: 1, min_entropy: 3.5, exclude_in_tests: true, live_credential: false, context: Ctx::None, default_fix: Some(FIX_ROTATE), confidence_base: 80 },
    PatternDef { id: "telegram-bot-token", category: Cat::Credentials, severity: Sev::High, regex: r"\b(\d{8,10}:AA[A-Za-z0-9_\-]{33})\b", capture: 1, min_entropy: 3.0, exclude_in_tests: true, live_credential: false, context: Ctx::None, default_fix: Some(FIX_ROTATE), confidence_base: 85 },
    PatternDef { id: "jwt-hardcoded-secret", category: Cat::Credentials, severity: Sev::Critical, regex: r#"(?i)jwt[_\-]?secret\s*[=:]\s*['"]([^'"]{8,})['"]"#, capture: 1, min_entropy: 2.5, exclude_in_tests: true, live_credential: false, context: Ctx::None, default_fix: Some(FIX_ENV), confidence_base: 85 },
    PatternDef { id: "database-url-credentials", category: Cat::Credentials, severity: Sev::Critical, regex: r#"((?:postgres(?:ql)?|mysql|mongodb(?:\+srv)?|redis)://[^:\s'"]+:[^@\s'"]+@[^\s'"]+)"#, capture: 1, min_entropy: 0.0, exclude_in_tests: false, live_credential: true, context: Ctx::None, default_fix: Some("read the connection string from the environment"), confidence_base: 92 },
    PatternDef { id: "private-key-pem", category: Cat::Credentials, severity: Sev::Critical, regex: r"(-----BEGIN (?:RSA |EC |DSA |OPENSSH |PGP )?PRIVATE KEY(?: BLOCK)?-----)", capture: 1, min_entropy: 0.0, exclude_in_tests: false, live_credential: true, context: Ctx::None, default_fix: Some("remove the key from the repository and rotate it"), confidence_base: 98 },
    PatternDef { id: "generic-api-key-assignment", category: Cat::Credentials, severity: Sev::High, regex: r#"(?i)(?:api[_\-]?key|apikey)\s*[=:]\s*['"]([A-Za-z0-9_\-]{16,})['"]"#, capture: 1, min_entropy: 3.0, exclude_in_tests: true, live_credential: false, context: Ctx::None, default_fix: Some(FIX_ENV), confidence_base: 70 },
    PatternDef { id: "generic-password-assignment", category: Cat::Credentials, severity: Sev::High, regex: r#"(?i)(?:password|passwd|pwd)\s*[=:]\s*['"]([^'"]{8,})['"]"#, capture: 1, min_entropy: 2.5, exclude_in_tests: true, live_credential: false, context: Ctx::None, default_fix: Some(FIX_ENV), confidence_base: 65 },
];
