//! Security patterns: injection, weak crypto, unsafe defaults.

use vibecheck_core::types::finding::{FindingCategory as Cat, Severity as Sev};

use crate::patterns::types::{ContextPredicate as Ctx, PatternDef};

pub static PATTERNS: &[PatternDef] = &[
    PatternDef { id: "sql-injection-concat", category: Cat::Security, severity: Sev::High, regex: r#"(?i)\.(?:query|execute)\s*\(\s*['"`][^'"`]*(?:select|insert|update|delete)\b[^'"`]*['"`]\s*\+"#, capture: 0, min_entropy: 0.0, exclude_in_tests: true, live_credential: false, context: Ctx::None, default_fix: Some("use parameterized queries"), confidence_base: 85 },
    PatternDef { id: "sql-injection-template", category: Cat::Security, severity: Sev::High, regex: r#"(?i)\.(?:query|execute)\s*\(\s*`[^`]*(?:select|insert|update|delete)\b[^`]*\$\{"#, capture: 0, min_entropy: 0.0, exclude_in_tests: true, live_credential: false, context: Ctx::None, default_fix: Some("use parameterized queries"), confidence_base: 85 },
    PatternDef { id: "command-injection", category: Cat::Security, severity: Sev::Critical, regex: r#"(?:\bexec(?:Sync)?|\bspawn(?:Sync)?)\s*\([^)]*(?:\$\{|\+\s*(?:req\.|input|args|params))"#, capture: 0, min_entropy: 0.0, exclude_in_tests: true, live_credential: false, context: Ctx::None, default_fix: Some("pass arguments as an array, never interpolate into a shell string"), confidence_base: 85 },
    PatternDef { id: "path-traversal", category: Cat::Security, severity: Sev::High, regex: r#"(?i)(?:readFile|writeFile|createReadStream|unlink|readdir|sendFile)[^;\n]*req\.(?:params|query|body)"#, capture: 0, min_entropy: 0.0, exclude_in_tests: true, live_credential: false, context: Ctx::None, default_fix: Some("resolve against a fixed base directory and reject traversal segments"), confidence_base: 80 },
    PatternDef { id: "eval-usage", category: Cat::Security, severity: Sev::High, regex: r"\beval\s*\(", capture: 0, min_entropy: 0.0, exclude_in_tests: true, live_credential: false, context: Ctx::None, default_fix: Some("replace eval with explicit parsing or dispatch"), confidence_base: 90 },
    PatternDef { id: "function-constructor", category: Cat::Security, severity: Sev::High, regex: r"\bnew\s+Function\s*\(", capture: 0, min_entropy: 0.0, exclude_in_tests: true, live_credential: false, context: Ctx::None, default_fix: Some("avoid runtime code construction"), confidence_base: 85 },
    PatternDef { id: "prototype-pollution", category: Cat::Security, severity: Sev::High, regex: r#"(?:__proto__|constructor\s*\.\s*prototype)\s*(?:\[|\.|\s*=)"#, capture: 0, min_entropy: 0.0, exclude_in_tests: true, live_credential: false, context: Ctx::None, default_fix: Some("guard object merges against __proto__ keys"), confidence_base: 80 },
    PatternDef { id: "open-redirect", category: Cat::Security, severity: Sev::Medium, regex: r#"(?i)res\.redirect\s*\(\s*(?:req\.(?:query|params|body))"#, capture: 0, min_entropy: 0.0, exclude_in_tests: true, live_credential: false, context: Ctx::None, default_fix: Some("validate redirect targets against an allowlist"), confidence_base: 85 },
    PatternDef { id: "ssrf-user-url", category: Cat::Security, severity: Sev::High, regex: r#"(?i)(?:\bfetch|axios(?:\.(?:get|post|put|delete))?|\bgot)\s*\(\s*req\.(?:query|params|body)"#, capture: 0, min_entropy: 0.0, exclude_in_tests: true, live_credential: false, context: Ctx::None, default_fix: Some("resolve and validate outbound hosts before fetching"), confidence_base: 80 },
    PatternDef { id: "xss-inner-html", category: Cat::Security, severity: Sev::Medium, regex: r"(?:innerHTML|outerHTML)\s*=|dangerouslySetInnerHTML", capture: 0, min_entropy: 0.0, exclude_in_tests: true, live_credential: false, context: Ctx::NotKeywordAnyOf(&["sanitize", "dompurify", "escapeHtml"]), default_fix: Some("sanitize HTML before injection or use text content"), confidence_base: 75 },
    PatternDef { id: "weak-hash", category: Cat::Security, severity: Sev::Medium, regex: r#"(?i)createHash\s*\(\s*['"](?:md5|sha1)['"]"#, capture: 0, min_entropy: 0.0, exclude_in_tests: true, live_credential: false, context: Ctx::None, default_fix: Some("use sha-256 or stronger"), confidence_base: 90 },
    PatternDef { id: "insecure-random-token", category: Cat::Security, severity: Sev::High, regex: r"Math\.random\s*\(\s*\)", capture: 0, min_entropy: 0.0, exclude_in_tests: true, live_credential: false, context: Ctx::KeywordAnyOf(&["token", "secret", "key", "session", "auth", "id", "password", "nonce", "otp"]), default_fix: Some("use crypto.randomBytes or crypto.randomUUID"), confidence_base: 85 },
    PatternDef { id: "permissive-cors", category: Cat::Security, severity: Sev::Medium, regex: r#"(?i)(?:Access-Control-Allow-Origin['"]?\s*[,:]\s*['"]\*|origin\s*:\s*['"]\*['"])"#, capture: 0, min_entropy: 0.0, exclude_in_tests: true, live_credential: false, context: Ctx::None, default_fix: Some("restrict CORS origins to known hosts"), confidence_base: 85 },
    PatternDef { id: "timing-unsafe-compare", category: Cat::Security, severity: Sev::Medium, regex: r"(?i)(?:token|secret|signature|apikey|api_key)\s*(?:===|!==|==|!=)", capture: 0, min_entropy: 0.0, exclude_in_tests: true, live_credential: false, context: Ctx::NotKeywordAnyOf(&["timingSafeEqual"]), default_fix: Some("compare secrets with crypto.timingSafeEqual"), confidence_base: 70 },
    PatternDef { id: "xxe-external-entities", category: Cat::Security, severity: Sev::High, regex: r#"(?i)(?:noent\s*:\s*true|<!ENTITY\s+\S+\s+SYSTEM)"#, capture: 0, min_entropy: 0.0, exclude_in_tests: true, live_credential: false, context: Ctx::None, default_fix: Some("disable external entity resolution"), confidence_base: 85 },
    PatternDef { id: "disabled-tls-verification", category: Cat::Security, severity: Sev::High, regex: r#"(?i)(?:rejectUnauthorized\s*:\s*false|NODE_TLS_REJECT_UNAUTHORIZED\s*=\s*['"]?0)"#, capture: 0, min_entropy: 0.0, exclude_in_tests: true, live_credential: false, context: Ctx::None, default_fix: Some("keep TLS verification enabled"), confidence_base: 90 },
];
