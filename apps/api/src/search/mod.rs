// Weighted-field fuzzy search over in-memory records.
// bitap: per-field approximate matching. index: field norms, weights, ranking.

pub mod bitap;
pub mod index;

pub use index::{FieldMatch, FuzzyIndex, Searchable, WeightedKey};

/// Tuning knobs for fuzzy matching. Defaults mirror the remedy search setup.
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyOptions {
    /// Maximum per-field score (0.0 exact, 1.0 anything) that still counts as a match.
    pub threshold: f64,
    /// Char offset where a match is expected to start.
    pub location: usize,
    /// How far from `location` a match may drift before it is fully penalized.
    pub distance: usize,
    pub min_match_char_length: usize,
    pub find_all_matches: bool,
    pub include_matches: bool,
    pub ignore_location: bool,
    pub ignore_field_norm: bool,
    pub field_norm_weight: f64,
}

impl Default for FuzzyOptions {
    fn default() -> Self {
        Self {
            threshold: 0.3,
            location: 0,
            distance: 100,
            min_match_char_length: 2,
            find_all_matches: false,
            include_matches: false,
            ignore_location: false,
            ignore_field_norm: false,
            field_norm_weight: 1.0,
        }
    }
}
