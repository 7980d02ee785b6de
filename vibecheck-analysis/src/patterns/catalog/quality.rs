//! Code-quality, debug, todo, and ai-smell patterns.

use vibecheck_core::types::finding::{FindingCategory as Cat, Severity as Sev};

use crate::patterns::types::{ContextPredicate as Ctx, PatternDef};

pub static PATTERNS: &[PatternDef] = &[
    // code-quality
    PatternDef { id: "empty-catch", category: Cat::CodeQuality, severity: Sev::Medium, regex: r"catch\s*(?:\([^)]*\))?\s*\{\s*\}", capture: 0, min_entropy: 0.0, exclude_in_tests: true, live_credential: false, context: Ctx::None, default_fix: Some("handle or rethrow the error"), confidence_base: 90 },
    PatternDef { id: "console-only-catch", category: Cat::CodeQuality, severity: Sev::Low, regex: r"catch\s*\([^)]*\)\s*\{\s*console\.(?:log|error|warn)\s*\([^)]*\)\s*;?\s*\}", capture: 0, min_entropy: 0.0, exclude_in_tests: true, live_credential: false, context: Ctx::None, default_fix: Some("propagate the failure instead of only logging it"), confidence_base: 80 },
    PatternDef { id: "process-exit-in-lib", category: Cat::CodeQuality, severity: Sev::Low, regex: r"process\.exit\s*\(", capture: 0, min_entropy: 0.0, exclude_in_tests: true, live_credential: false, context: Ctx::None, default_fix: None, confidence_base: 65 },
    // debug
    PatternDef { id: "console-log", category: Cat::Debug, severity: Sev::Low, regex: r"\bconsole\.log\s*\(", capture: 0, min_entropy: 0.0, exclude_in_tests: true, live_credential: false, context: Ctx::None, default_fix: Some("remove the statement or route it through the logger"), confidence_base: 85 },
    PatternDef { id: "console-trace", category: Cat::Debug, severity: Sev::Low, regex: r"\bconsole\.(?:debug|trace)\s*\(", capture: 0, min_entropy: 0.0, exclude_in_tests: true, live_credential: false, context: Ctx::None, default_fix: None, confidence_base: 85 },
    PatternDef { id: "debugger-statement", category: Cat::Debug, severity: Sev::Medium, regex: r"\bdebugger\s*;?", capture: 0, min_entropy: 0.0, exclude_in_tests: true, live_credential: false, context: Ctx::None, default_fix: Some("remove the debugger statement"), confidence_base: 95 },
    PatternDef { id: "alert-call", category: Cat::Debug, severity: Sev::Low, regex: r"\balert\s*\(", capture: 0, min_entropy: 0.0, exclude_in_tests: true, live_credential: false, context: Ctx::None, default_fix: None, confidence_base: 70 },
    // todo
    PatternDef { id: "todo-comment", category: Cat::Todo, severity: Sev::Low, regex: r"//\s*(?i:todo)\b", capture: 0, min_entropy: 0.0, exclude_in_tests: true, live_credential: false, context: Ctx::None, default_fix: None, confidence_base: 95 },
    PatternDef { id: "fixme-comment", category: Cat::Todo, severity: Sev::Low, regex: r"//\s*(?i:fixme|hack|xxx)\b", capture: 0, min_entropy: 0.0, exclude_in_tests: true, live_credential: false, context: Ctx::None, default_fix: None, confidence_base: 95 },
    // ai-smell
    PatternDef { id: "as-any-cast", category: Cat::AiSmell, severity: Sev::Low, regex: r"\bas\s+any\b", capture: 0, min_entropy: 0.0, exclude_in_tests: true, live_credential: false, context: Ctx::None, default_fix: Some("type the expression instead of widening to any"), confidence_base: 80 },
    PatternDef { id: "ts-suppression", category: Cat::AiSmell, severity: Sev::Low, regex: r"@ts-(?:ignore|nocheck|expect-error)", capture: 0, min_entropy: 0.0, exclude_in_tests: true, live_credential: false, context: Ctx::None, default_fix: None, confidence_base: 85 },
    PatternDef { id: "blanket-eslint-disable", category: Cat::AiSmell, severity: Sev::Low, regex: r"/\*\s*eslint-disable\s*\*/", capture: 0, min_entropy: 0.0, exclude_in_tests: true, live_credential: false, context: Ctx::None, default_fix: Some("scope the disable to the specific rule and line"), confidence_base: 85 },
    PatternDef { id: "assistant-apology-comment", category: Cat::AiSmell, severity: Sev::Low, regex: r"(?i)//\s*(?:sorry|oops|as an ai|i (?:can't|cannot|am unable))", capture: 0, min_entropy: 0.0, exclude_in_tests: true, live_credential: false, context: Ctx::None, default_fix: Some("delete the conversational comment"), confidence_base: 90 },
    PatternDef { id: "placeholder-implementation-comment", category: Cat::AiSmell, severity: Sev::Medium, regex: r"(?i)//\s*(?:your (?:code|logic|implementation) (?:here|goes here)|implementation goes here|add your .{0,40} here)", capture: 0, min_entropy: 0.0, exclude_in_tests: true, live_credential: false, context: Ctx::None, default_fix: Some("fill in the implementation"), confidence_base: 90 },
];
