//! Bitap approximate string matching.
//!
//! Scores a lowercased pattern against a text allowing up to `pattern_len - 1`
//! errors. The score combines the error ratio with how far the match sits from
//! the expected location, so lower is better and `0.0` is a perfect match.

use std::collections::HashMap;

use super::FuzzyOptions;

/// Longest pattern a single bit-vector pass can handle.
pub const MAX_BITS: usize = 32;

/// Outcome of matching one pattern against one text.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub is_match: bool,
    pub score: f64,
    /// Inclusive `(start, end)` char ranges that matched. Filled only when
    /// `include_matches` is set.
    pub indices: Vec<(usize, usize)>,
}

struct Chunk {
    pattern: Vec<char>,
    alphabet: HashMap<char, u64>,
    start_index: usize,
}

/// A compiled search pattern, reusable across many texts.
pub struct BitapSearcher {
    pattern: Vec<char>,
    chunks: Vec<Chunk>,
    options: FuzzyOptions,
}

impl BitapSearcher {
    pub fn new(pattern: &str, options: FuzzyOptions) -> Self {
        let pattern: Vec<char> = pattern.to_lowercase().chars().collect();
        let mut chunks = Vec::new();

        let len = pattern.len();
        if len > MAX_BITS {
            let remainder = len % MAX_BITS;
            let end = len - remainder;
            let mut i = 0;
            while i < end {
                chunks.push(Chunk::new(&pattern[i..i + MAX_BITS], i));
                i += MAX_BITS;
            }
            if remainder > 0 {
                let start_index = len - MAX_BITS;
                chunks.push(Chunk::new(&pattern[start_index..], start_index));
            }
        } else if len > 0 {
            chunks.push(Chunk::new(&pattern, 0));
        }

        Self {
            pattern,
            chunks,
            options,
        }
    }

    pub fn search_in(&self, text: &str) -> MatchResult {
        let text: Vec<char> = text.to_lowercase().chars().collect();

        if self.chunks.is_empty() {
            return MatchResult {
                is_match: false,
                score: 1.0,
                indices: vec![],
            };
        }

        if self.pattern == text {
            let indices = if self.options.include_matches {
                vec![(0, text.len() - 1)]
            } else {
                vec![]
            };
            return MatchResult {
                is_match: true,
                score: 0.0,
                indices,
            };
        }

        let mut all_indices = Vec::new();
        let mut total_score = 0.0;
        let mut has_matches = false;

        for chunk in &self.chunks {
            let result = search_chunk(
                &text,
                &chunk.pattern,
                &chunk.alphabet,
                self.options.location + chunk.start_index,
                &self.options,
            );
            if result.is_match {
                has_matches = true;
            }
            total_score += result.score;
            if result.is_match {
                all_indices.extend(result.indices);
            }
        }

        MatchResult {
            is_match: has_matches,
            score: if has_matches {
                total_score / self.chunks.len() as f64
            } else {
                1.0
            },
            indices: if has_matches && self.options.include_matches {
                all_indices
            } else {
                vec![]
            },
        }
    }
}

impl Chunk {
    fn new(pattern: &[char], start_index: usize) -> Self {
        Self {
            pattern: pattern.to_vec(),
            alphabet: pattern_alphabet(pattern),
            start_index,
        }
    }
}

/// Bit mask per character: bit `len - i - 1` is set when `pattern[i] == c`.
fn pattern_alphabet(pattern: &[char]) -> HashMap<char, u64> {
    let len = pattern.len();
    let mut mask = HashMap::new();
    for (i, &c) in pattern.iter().enumerate() {
        *mask.entry(c).or_insert(0u64) |= 1u64 << (len - i - 1);
    }
    mask
}

fn compute_score(
    pattern_len: usize,
    errors: usize,
    current_location: i64,
    expected_location: i64,
    options: &FuzzyOptions,
) -> f64 {
    let accuracy = errors as f64 / pattern_len as f64;
    if options.ignore_location {
        return accuracy;
    }

    let proximity = (expected_location - current_location).abs();
    if options.distance == 0 {
        return if proximity != 0 { 1.0 } else { accuracy };
    }

    accuracy + proximity as f64 / options.distance as f64
}

fn find_from(text: &[char], pattern: &[char], from: usize) -> Option<usize> {
    if pattern.is_empty() || from > text.len() || pattern.len() > text.len() - from {
        return None;
    }
    (from..=text.len() - pattern.len()).find(|&i| text[i..i + pattern.len()] == *pattern)
}

fn search_chunk(
    text: &[char],
    pattern: &[char],
    alphabet: &HashMap<char, u64>,
    location: usize,
    options: &FuzzyOptions,
) -> MatchResult {
    let pattern_len = pattern.len();
    let text_len = text.len();
    let expected_location = location.min(text_len) as i64;

    let mut current_threshold = options.threshold;
    let compute_matches = options.min_match_char_length > 1 || options.include_matches;
    let mut match_mask = if compute_matches {
        vec![false; text_len]
    } else {
        Vec::new()
    };

    // Exact occurrences bound the threshold for the fuzzy pass.
    let mut from = expected_location as usize;
    while let Some(index) = find_from(text, pattern, from) {
        let score = compute_score(pattern_len, 0, index as i64, expected_location, options);
        current_threshold = current_threshold.min(score);
        from = index + pattern_len;
        if compute_matches {
            for slot in &mut match_mask[index..index + pattern_len] {
                *slot = true;
            }
        }
    }

    let mut best_location: i64 = -1;
    let mut last_bit_arr: Vec<u64> = Vec::new();
    let mut final_score = 1.0;
    let mut bin_max = (pattern_len + text_len) as i64;
    let mask: u64 = 1 << (pattern_len - 1);

    for i in 0..pattern_len {
        // Widest window where a match with `i` errors could still pass.
        let mut bin_min: i64 = 0;
        let mut bin_mid = bin_max;
        while bin_min < bin_mid {
            let score = compute_score(
                pattern_len,
                i,
                expected_location + bin_mid,
                expected_location,
                options,
            );
            if score <= current_threshold {
                bin_min = bin_mid;
            } else {
                bin_max = bin_mid;
            }
            bin_mid = (bin_max - bin_min) / 2 + bin_min;
        }
        bin_max = bin_mid;

        let mut start = (expected_location - bin_mid + 1).max(1);
        let finish = if options.find_all_matches {
            text_len as i64
        } else {
            (expected_location + bin_mid).min(text_len as i64) + pattern_len as i64
        };

        let mut bit_arr = vec![0u64; (finish + 2) as usize];
        bit_arr[(finish + 1) as usize] = (1u64 << i) - 1;

        let mut j = finish;
        while j >= start {
            let current_location = j - 1;
            let char_match = text
                .get(current_location as usize)
                .and_then(|c| alphabet.get(c))
                .copied()
                .unwrap_or(0);

            if compute_matches {
                if let Some(slot) = match_mask.get_mut(current_location as usize) {
                    *slot = char_match != 0;
                }
            }

            let ju = j as usize;
            bit_arr[ju] = ((bit_arr[ju + 1] << 1) | 1) & char_match;
            if i > 0 {
                let prev = bit_at(&last_bit_arr, ju);
                let prev_next = bit_at(&last_bit_arr, ju + 1);
                bit_arr[ju] |= ((prev_next | prev) << 1) | 1 | prev_next;
            }

            if bit_arr[ju] & mask != 0 {
                final_score = compute_score(
                    pattern_len,
                    i,
                    current_location,
                    expected_location,
                    options,
                );
                if final_score <= current_threshold {
                    current_threshold = final_score;
                    best_location = current_location;
                    if best_location <= expected_location {
                        break;
                    }
                    start = (2 * expected_location - best_location).max(1);
                }
            }
            j -= 1;
        }

        // No chance of a better match with one more error.
        let score = compute_score(
            pattern_len,
            i + 1,
            expected_location,
            expected_location,
            options,
        );
        if score > current_threshold {
            break;
        }
        last_bit_arr = bit_arr;
    }

    let mut result = MatchResult {
        is_match: best_location >= 0,
        score: final_score.max(0.001),
        indices: vec![],
    };

    if compute_matches {
        let indices = mask_to_indices(&match_mask, options.min_match_char_length);
        if indices.is_empty() {
            result.is_match = false;
        } else if options.include_matches {
            result.indices = indices;
        }
    }

    result
}

fn bit_at(arr: &[u64], idx: usize) -> u64 {
    arr.get(idx).copied().unwrap_or(0)
}

/// Collapses a per-char match mask into runs at least `min_len` long.
pub fn mask_to_indices(mask: &[bool], min_len: usize) -> Vec<(usize, usize)> {
    let mut indices = Vec::new();
    let mut start: Option<usize> = None;

    for (i, &matched) in mask.iter().enumerate() {
        match (matched, start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                if i - s >= min_len {
                    indices.push((s, i - 1));
                }
                start = None;
            }
            _ => {}
        }
    }

    if let Some(s) = start {
        if mask.len() - s >= min_len {
            indices.push((s, mask.len() - 1));
        }
    }

    indices
}

#[cfg(test)]
mod tests {
    use super::*;

    fn searcher(pattern: &str) -> BitapSearcher {
        BitapSearcher::new(pattern, FuzzyOptions::default())
    }

    #[test]
    fn test_identical_text_scores_zero() {
        let result = searcher("Headache").search_in("headache");
        assert!(result.is_match);
        assert_eq!(result.score, 0.0);
    }

    #[test]
    fn test_exact_prefix_hits_score_floor() {
        let result = searcher("ginger").search_in("ginger tea");
        assert!(result.is_match);
        assert!((result.score - 0.001).abs() < 1e-9, "score was {}", result.score);
    }

    #[test]
    fn test_single_typo_still_matches() {
        let result = searcher("hedache").search_in("headache");
        assert!(result.is_match);
        assert!(result.score > 0.001 && result.score <= 0.3);
    }

    #[test]
    fn test_unrelated_text_does_not_match() {
        let result = searcher("insomnia").search_in("turmeric milk");
        assert!(!result.is_match);
        assert_eq!(result.score, 1.0);
    }

    #[test]
    fn test_far_location_exceeds_threshold() {
        // Exact match 60 chars in: proximity alone is 0.6 > 0.3
        let text = format!("{}ginger", "x".repeat(60));
        let result = searcher("ginger").search_in(&text);
        assert!(!result.is_match);
    }

    #[test]
    fn test_near_location_is_penalized_but_matches() {
        let text = format!("{}ginger", "x".repeat(10));
        let result = searcher("ginger").search_in(&text);
        assert!(result.is_match);
        assert!((result.score - 0.1).abs() < 1e-9, "score was {}", result.score);
    }

    #[test]
    fn test_ignore_location_scores_only_errors() {
        let options = FuzzyOptions {
            ignore_location: true,
            ..FuzzyOptions::default()
        };
        let text = format!("{}ginger", "x".repeat(200));
        let result = BitapSearcher::new("ginger", options).search_in(&text);
        assert!(result.is_match);
        assert!((result.score - 0.001).abs() < 1e-9);
    }

    #[test]
    fn test_empty_pattern_never_matches() {
        let result = searcher("").search_in("anything");
        assert!(!result.is_match);
    }

    #[test]
    fn test_long_pattern_is_chunked() {
        let pattern = "a soothing blend of honey and warm lemon water";
        let s = searcher(pattern);
        assert_eq!(s.chunks.len(), 2);
        assert_eq!(s.chunks[1].start_index, pattern.chars().count() - MAX_BITS);
        assert!(s.search_in(pattern).is_match);
    }

    #[test]
    fn test_include_matches_reports_ranges() {
        let options = FuzzyOptions {
            include_matches: true,
            ..FuzzyOptions::default()
        };
        let result = BitapSearcher::new("tea", options).search_in("tea time");
        assert!(result.is_match);
        assert!(result.indices.contains(&(0, 2)));
    }

    #[test]
    fn test_shorter_text_still_matches() {
        let result = searcher("chamomile").search_in("chamomil");
        assert!(result.is_match);
        assert!((result.score - 1.0 / 9.0).abs() < 1e-3, "score was {}", result.score);
    }

    #[test]
    fn test_non_ascii_pattern_matches_per_char() {
        let s = searcher("tés");
        assert_eq!(s.chunks[0].pattern.len(), 3);
        let result = s.search_in("TÉS chaud");
        assert!(result.is_match);
        assert!(result.score <= 0.3);
        assert!(!searcher("tés").search_in("xyz").is_match);
    }

    #[test]
    fn test_chunked_ranges_come_only_from_matching_chunks() {
        let options = FuzzyOptions {
            include_matches: true,
            ..FuzzyOptions::default()
        };
        let pattern = "a soothing blend of honey and warm lemon water";
        let s = BitapSearcher::new(pattern, options);
        assert_eq!(s.chunks.len(), 2);

        // Only the first chunk is present; the second needs too many edits.
        let result = s.search_in(&pattern[..MAX_BITS]);
        assert!(result.is_match);
        assert_eq!(result.indices, vec![(0, MAX_BITS - 1)]);
    }

    #[test]
    fn test_mask_to_indices_respects_min_len() {
        let mask = [true, false, true, true, false, true, true, true];
        assert_eq!(mask_to_indices(&mask, 1), vec![(0, 0), (2, 3), (5, 7)]);
        assert_eq!(mask_to_indices(&mask, 2), vec![(2, 3), (5, 7)]);
        assert_eq!(mask_to_indices(&mask, 3), vec![(5, 7)]);
    }

    #[test]
    fn test_mask_to_indices_empty() {
        assert!(mask_to_indices(&[], 2).is_empty());
        assert!(mask_to_indices(&[false, false], 1).is_empty());
    }

    #[test]
    fn test_pattern_alphabet_bits() {
        let pattern: Vec<char> = "aba".chars().collect();
        let alphabet = pattern_alphabet(&pattern);
        assert_eq!(alphabet[&'a'], 0b101);
        assert_eq!(alphabet[&'b'], 0b010);
    }
}
