//! Pattern definitions: static records compiled once at registry build.

use aho_corasick::AhoCorasick;
use regex::Regex;

use vibecheck_core::types::finding::{FindingCategory, Severity};

/// Line-context requirement, kept as a tagged record so the whole catalog
/// stays serializable and auditable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextPredicate {
    /// No requirement.
    None,
    /// The surrounding line must mention at least one keyword.
    KeywordAnyOf(&'static [&'static str]),
    /// The surrounding line must mention none of the keywords.
    NotKeywordAnyOf(&'static [&'static str]),
}

/// One detection rule. Immutable for the process lifetime.
#[derive(Debug, Clone, Copy)]
pub struct PatternDef {
    /// Unique id, kebab-case.
    pub id: &'static str,
    pub category: FindingCategory,
    pub severity: Severity,
    /// Regex with at most one capture group for "the secret value".
    /// With no capture group, the full match is the value.
    pub regex: &'static str,
    /// Capture index of the value; 0 = whole match.
    pub capture: usize,
    /// Candidates below this Shannon entropy are discarded. 0.0 disables.
    pub min_entropy: f64,
    /// Skip matches in test/example paths.
    pub exclude_in_tests: bool,
    /// Live credentials are never skipped or downgraded by path context.
    pub live_credential: bool,
    pub context: ContextPredicate,
    pub default_fix: Option<&'static str>,
    /// Base confidence, 0–100.
    pub confidence_base: u8,
}

/// A pattern with its regex (and keyword matcher) compiled.
pub struct CompiledPattern {
    pub def: &'static PatternDef,
    pub regex: Regex,
    keywords: Option<AhoCorasick>,
}

impl CompiledPattern {
    pub fn compile(def: &'static PatternDef) -> Option<Self> {
        let regex = match Regex::new(def.regex) {
            Ok(regex) => regex,
            Err(e) => {
                tracing::error!(pattern_id = def.id, error = %e, "pattern failed to compile");
                return None;
            }
        };
        let keywords = match def.context {
            ContextPredicate::None => None,
            ContextPredicate::KeywordAnyOf(words) | ContextPredicate::NotKeywordAnyOf(words) => {
                AhoCorasick::builder()
                    .ascii_case_insensitive(true)
                    .build(words)
                    .ok()
            }
        };
        Some(Self {
            def,
            regex,
            keywords,
        })
    }

    /// Evaluate the context predicate against the full line.
    pub fn context_allows(&self, line: &str) -> bool {
        match (&self.def.context, &self.keywords) {
            (ContextPredicate::None, _) => true,
            (ContextPredicate::KeywordAnyOf(_), Some(ac)) => ac.is_match(line),
            (ContextPredicate::NotKeywordAnyOf(_), Some(ac)) => !ac.is_match(line),
            // Keyword matcher failed to build: fail open for NotKeyword,
            // closed for Keyword.
            (ContextPredicate::KeywordAnyOf(_), None) => false,
            (ContextPredicate::NotKeywordAnyOf(_), None) => true,
        }
    }

    /// Extract the candidate value and its column from a line, if any.
    pub fn first_match<'a>(&self, line: &'a str) -> Option<(&'a str, usize)> {
        let captures = self.regex.captures(line)?;
        let group = captures.get(self.def.capture).or_else(|| captures.get(0))?;
        Some((group.as_str(), captures.get(0).map(|m| m.start()).unwrap_or(0)))
    }
}

impl std::fmt::Debug for CompiledPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledPattern")
            .field("id", &self.def.id)
            .finish()
    }
}
