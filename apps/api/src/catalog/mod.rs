//! The static remedy dataset, loaded once and searched in memory.
//!
//! Ranking: health issue (weight 3) > name (weight 2) > remedy text (weight 1),
//! with a per-field similarity threshold (0.3 by default).

use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::models::remedy::{Remedy, ScoredRemedy, KEY_HEALTH_ISSUE, KEY_NAME, KEY_REMEDY};
use crate::search::{FuzzyIndex, FuzzyOptions, WeightedKey};

pub mod handlers;

/// How many health issues are offered as quick-filter categories.
pub const POPULAR_CATEGORY_COUNT: usize = 8;
/// Minimum query length before suggestions are offered.
pub const MIN_SUGGESTION_QUERY_LEN: usize = 2;
/// Cap on record-name suggestions appended after health issues.
pub const MAX_NAME_SUGGESTIONS: usize = 5;

pub fn search_keys() -> Vec<WeightedKey> {
    vec![
        WeightedKey::new(KEY_NAME, 2.0),
        WeightedKey::new(KEY_HEALTH_ISSUE, 3.0),
        WeightedKey::new(KEY_REMEDY, 1.0),
    ]
}

pub struct RemedyCatalog {
    remedies: Vec<Remedy>,
    index: FuzzyIndex,
    health_issues: Vec<String>,
}

impl RemedyCatalog {
    /// Reads a JSON array of remedy records from `path`.
    pub fn load(path: &Path, options: FuzzyOptions) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read remedy dataset at {}", path.display()))?;
        let records: Vec<Remedy> = serde_json::from_str(&raw)
            .with_context(|| format!("Remedy dataset at {} is not valid", path.display()))?;
        let catalog = Self::from_records(records, options)?;
        info!(
            "Loaded {} remedies covering {} health issues from {}",
            catalog.len(),
            catalog.health_issues.len(),
            path.display()
        );
        Ok(catalog)
    }

    pub fn from_records(records: Vec<Remedy>, options: FuzzyOptions) -> Result<Self> {
        let total = records.len();
        let remedies: Vec<Remedy> = records
            .into_iter()
            .filter(|r| !r.name.trim().is_empty())
            .collect();
        if remedies.len() < total {
            warn!(
                "Dropped {} remedy records without a name",
                total - remedies.len()
            );
        }

        let index = FuzzyIndex::new(&remedies, search_keys(), options)?;
        let health_issues = remedies
            .iter()
            .map(|r| r.health_issue.trim())
            .filter(|issue| !issue.is_empty())
            .map(str::to_string)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        Ok(Self {
            remedies,
            index,
            health_issues,
        })
    }

    pub fn len(&self) -> usize {
        self.remedies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.remedies.is_empty()
    }

    /// Ranked dataset matches. A blank query matches nothing. The category
    /// filter is an exact health-issue match applied after ranking.
    pub fn search(
        &self,
        query: &str,
        category: Option<&str>,
        limit: Option<usize>,
    ) -> Vec<ScoredRemedy> {
        let query = query.trim();
        if query.is_empty() {
            return vec![];
        }

        let category = category.map(str::trim).filter(|c| !c.is_empty());
        self.index
            .search(query)
            .into_iter()
            .map(|hit| {
                let remedy = &self.remedies[hit.idx];
                (hit, remedy)
            })
            .filter(|(_, r)| category.map_or(true, |c| r.health_issue.trim() == c))
            .take(limit.unwrap_or(usize::MAX))
            .map(|(hit, remedy)| ScoredRemedy {
                remedy: remedy.clone(),
                score: hit.score,
                matches: hit.matches,
            })
            .collect()
    }

    /// Names of every dataset match for `query`, best first.
    pub fn matching_names(&self, query: &str) -> Vec<String> {
        self.search(query, None, None)
            .into_iter()
            .map(|hit| hit.remedy.name)
            .collect()
    }

    /// Sorted, de-duplicated health issues.
    pub fn health_issues(&self) -> &[String] {
        &self.health_issues
    }

    pub fn categories(&self) -> &[String] {
        let n = self.health_issues.len().min(POPULAR_CATEGORY_COUNT);
        &self.health_issues[..n]
    }

    /// Search-as-you-type suggestions: matching health issues, then up to
    /// five matching remedy names. Substring match, case-insensitive.
    pub fn suggestions(&self, query: &str) -> Vec<String> {
        let needle = query.trim().to_lowercase();
        if needle.chars().count() < MIN_SUGGESTION_QUERY_LEN {
            return vec![];
        }

        let issues = self
            .health_issues
            .iter()
            .filter(|issue| issue.to_lowercase().contains(&needle));
        let names = self
            .remedies
            .iter()
            .map(|r| &r.name)
            .filter(|name| name.to_lowercase().contains(&needle))
            .take(MAX_NAME_SUGGESTIONS);

        let mut seen: HashSet<&String> = HashSet::new();
        issues
            .chain(names)
            .filter(|s| seen.insert(*s))
            .cloned()
            .collect()
    }
}
