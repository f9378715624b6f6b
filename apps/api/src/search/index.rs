use anyhow::{ensure, Result};
use serde::Serialize;

use super::bitap::BitapSearcher;
use super::FuzzyOptions;

/// Anything whose named string fields can be fuzzy-searched.
pub trait Searchable {
    fn field(&self, key: &str) -> Option<&str>;
}

/// A searchable field and its relative importance.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedKey {
    pub name: String,
    pub weight: f64,
}

impl WeightedKey {
    pub fn new(name: impl Into<String>, weight: f64) -> Self {
        Self {
            name: name.into(),
            weight,
        }
    }
}

/// One field of a record that matched the query.
#[derive(Debug, Clone, Serialize)]
pub struct FieldMatch {
    pub key: String,
    pub score: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub indices: Vec<(usize, usize)>,
}

/// A matching record. `idx` is its position in the indexed slice.
#[derive(Debug, Clone)]
pub struct FuzzyHit {
    pub idx: usize,
    pub score: f64,
    pub matches: Vec<FieldMatch>,
}

struct IndexedField {
    key: usize,
    text: String,
    norm: f64,
}

/// Pre-computed field texts and norms for a fixed record set.
pub struct FuzzyIndex {
    keys: Vec<WeightedKey>,
    records: Vec<Vec<IndexedField>>,
    options: FuzzyOptions,
}

impl FuzzyIndex {
    /// Indexes `records` on `keys`. Key weights are normalized to sum to 1.
    pub fn new<T: Searchable>(
        records: &[T],
        keys: Vec<WeightedKey>,
        options: FuzzyOptions,
    ) -> Result<Self> {
        ensure!(!keys.is_empty(), "at least one search key is required");
        ensure!(
            keys.iter().all(|k| k.weight > 0.0),
            "search key weights must be positive"
        );

        let total: f64 = keys.iter().map(|k| k.weight).sum();
        let keys: Vec<WeightedKey> = keys
            .into_iter()
            .map(|k| WeightedKey::new(k.name, k.weight / total))
            .collect();

        let records = records
            .iter()
            .map(|record| {
                keys.iter()
                    .enumerate()
                    .filter_map(|(key, k)| {
                        let text = record.field(&k.name)?;
                        if text.trim().is_empty() {
                            return None;
                        }
                        Some(IndexedField {
                            key,
                            text: text.to_string(),
                            norm: field_norm(text, options.field_norm_weight),
                        })
                    })
                    .collect()
            })
            .collect();

        Ok(Self {
            keys,
            records,
            options,
        })
    }

    #[cfg(test)]
    pub fn keys(&self) -> &[WeightedKey] {
        &self.keys
    }

    /// Returns matching records, best (lowest score) first; ties keep index order.
    pub fn search(&self, query: &str) -> Vec<FuzzyHit> {
        let searcher = BitapSearcher::new(query, self.options.clone());
        let mut hits = Vec::new();

        for (idx, fields) in self.records.iter().enumerate() {
            let mut total_score = 1.0_f64;
            let mut matches = Vec::new();

            for field in fields {
                let result = searcher.search_in(&field.text);
                if !result.is_match {
                    continue;
                }

                let key = &self.keys[field.key];
                let norm = if self.options.ignore_field_norm {
                    1.0
                } else {
                    field.norm
                };
                let base = if result.score == 0.0 {
                    f64::EPSILON
                } else {
                    result.score
                };
                total_score *= base.powf(key.weight * norm);

                matches.push(FieldMatch {
                    key: key.name.clone(),
                    score: result.score,
                    indices: result.indices,
                });
            }

            if !matches.is_empty() {
                hits.push(FuzzyHit {
                    idx,
                    score: total_score,
                    matches,
                });
            }
        }

        hits.sort_by(|a, b| {
            a.score
                .partial_cmp(&b.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.idx.cmp(&b.idx))
        });
        hits
    }
}

/// `1 / tokens^(0.5 * weight)` rounded to 3 decimals; tokens are runs of non-space chars.
fn field_norm(text: &str, weight: f64) -> f64 {
    let tokens = text.split(' ').filter(|t| !t.is_empty()).count().max(1);
    let norm = 1.0 / (tokens as f64).powf(0.5 * weight);
    (norm * 1000.0).round() / 1000.0
}
