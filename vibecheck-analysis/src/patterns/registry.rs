//! PatternRegistry — compile once, filter by category, enable/disable.

use vibecheck_core::types::finding::FindingCategory;
use vibecheck_core::{FxHashMap, FxHashSet};

use super::catalog;
use super::types::{CompiledPattern, PatternDef};

/// Immutable catalog of compiled detection rules. Registration is
/// append-only at startup; scanning takes `&self` and never mutates.
pub struct PatternRegistry {
    patterns: Vec<CompiledPattern>,
    by_id: FxHashMap<&'static str, usize>,
    disabled: FxHashSet<String>,
    critical_only: bool,
}

impl PatternRegistry {
    /// Empty registry; callers register their own defs.
    pub fn new() -> Self {
        Self {
            patterns: Vec::new(),
            by_id: FxHashMap::default(),
            disabled: FxHashSet::default(),
            critical_only: false,
        }
    }

    /// Registry with the full built-in catalog compiled.
    pub fn with_builtin_catalog() -> Self {
        let mut registry = Self::new();
        for def in catalog::full_catalog() {
            registry.register(def);
        }
        registry
    }

    /// Compile and append one pattern. Duplicate ids are rejected.
    pub fn register(&mut self, def: &'static PatternDef) -> bool {
        if self.by_id.contains_key(def.id) {
            tracing::warn!(pattern_id = def.id, "duplicate pattern id ignored");
            return false;
        }
        match CompiledPattern::compile(def) {
            Some(compiled) => {
                self.by_id.insert(def.id, self.patterns.len());
                self.patterns.push(compiled);
                true
            }
            None => false,
        }
    }

    /// Disable a pattern by id.
    pub fn disable(&mut self, id: &str) {
        self.disabled.insert(id.to_string());
    }

    /// Re-enable a previously disabled pattern.
    pub fn enable(&mut self, id: &str) {
        self.disabled.remove(id);
    }

    /// Only run critical-severity patterns.
    pub fn set_critical_only(&mut self, critical_only: bool) {
        self.critical_only = critical_only;
    }

    pub fn get(&self, id: &str) -> Option<&CompiledPattern> {
        self.by_id.get(id).map(|&idx| &self.patterns[idx])
    }

    /// Enabled patterns in registration order. Registration order is the
    /// precedence order for the one-finding-per-(category, line) rule.
    pub fn enabled(&self) -> impl Iterator<Item = &CompiledPattern> {
        self.patterns.iter().filter(move |p| self.is_enabled(p))
    }

    /// Enabled patterns of one category.
    pub fn by_category(
        &self,
        category: FindingCategory,
    ) -> impl Iterator<Item = &CompiledPattern> {
        self.enabled().filter(move |p| p.def.category == category)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn enabled_count(&self) -> usize {
        self.enabled().count()
    }

    fn is_enabled(&self, pattern: &CompiledPattern) -> bool {
        if self.disabled.contains(pattern.def.id) {
            return false;
        }
        if self.critical_only
            && pattern.def.severity != vibecheck_core::types::finding::Severity::Critical
        {
            return false;
        }
        true
    }
}

impl Default for PatternRegistry {
    fn default() -> Self {
        Self::with_builtin_catalog()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_compiles_fully() {
        let registry = PatternRegistry::with_builtin_catalog();
        assert_eq!(registry.len(), catalog::full_catalog().count());
        assert!(registry.get("stripe-live-key").is_some());
    }

    #[test]
    fn disable_and_critical_only_filtering() {
        let mut registry = PatternRegistry::with_builtin_catalog();
        let all = registry.enabled_count();
        registry.disable("console-log");
        assert_eq!(registry.enabled_count(), all - 1);
        registry.enable("console-log");
        assert_eq!(registry.enabled_count(), all);

        registry.set_critical_only(true);
        assert!(registry.enabled_count() < all);
        assert!(registry
            .enabled()
            .all(|p| p.def.severity == vibecheck_core::types::finding::Severity::Critical));
    }

    #[test]
    fn context_predicate_gates_matches() {
        let registry = PatternRegistry::with_builtin_catalog();
        let pattern = registry.get("insecure-random-token").unwrap();
        assert!(pattern.context_allows("const sessionToken = Math.random();"));
        assert!(!pattern.context_allows("const jitter = Math.random();"));
    }
}
