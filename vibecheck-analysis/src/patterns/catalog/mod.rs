//! The built-in pattern catalog, grouped by category.
//!
//! Registration is append-only at registry construction; scanning never
//! mutates these tables.

pub mod credentials;
pub mod hallucinations;
pub mod mock_data;
pub mod quality;
pub mod security;

use super::types::PatternDef;

/// Every built-in pattern, in registration (and therefore precedence)
/// order: credentials first, then security, then the softer categories.
pub fn full_catalog() -> impl Iterator<Item = &'static PatternDef> {
    credentials::PATTERNS
        .iter()
        .chain(security::PATTERNS.iter())
        .chain(hallucinations::PATTERNS.iter())
        .chain(mock_data::PATTERNS.iter())
        .chain(quality::PATTERNS.iter())
}

#[cfg(test)]
mod tests {
    use super::*;
    use vibecheck_core::FxHashSet;

    #[test]
    fn catalog_ids_are_unique() {
        let mut seen = FxHashSet::default();
        for def in full_catalog() {
            assert!(seen.insert(def.id), "duplicate pattern id: {}", def.id);
        }
    }

    #[test]
    fn credential_catalog_covers_required_providers() {
        assert!(credentials::PATTERNS.len() >= 19);
    }

    #[test]
    fn every_pattern_compiles() {
        for def in full_catalog() {
            assert!(
                regex::Regex::new(def.regex).is_ok(),
                "pattern {} does not compile",
                def.id
            );
        }
    }
}
