use std::collections::HashSet;

use crate::config::MatchConfig;
use crate::model::StagingProduct;
use crate::normalize::{normalize, significant_words};

/// Strategy for resolving a free-text product name against a candidate pool.
///
/// Implementations must skip candidates whose id is in `excluded` and return
/// `None` rather than a weak match.
pub trait NameMatcher {
    fn find_best_match<'a>(
        &self,
        query: &str,
        candidates: &'a [StagingProduct],
        excluded: &HashSet<String>,
    ) -> Option<&'a StagingProduct>;
}

/// Word-overlap scorer over normalized titles.
///
/// An exact normalized-title match wins immediately. Otherwise every
/// (query word, candidate word) pair contributes `exact_word_score` when
/// equal or `partial_word_score` when one contains the other. Ties keep the
/// first candidate seen. Cost is O(candidates × words²), fine for catalogs
/// in the thousands.
#[derive(Debug, Clone, Default)]
pub struct TokenOverlapMatcher {
    config: MatchConfig,
}

impl TokenOverlapMatcher {
    pub fn new(config: MatchConfig) -> Self {
        Self { config }
    }

    /// Overlap score of two raw titles. Exact normalized equality is not
    /// special-cased here.
    pub fn score(&self, query: &str, candidate_name: &str) -> u32 {
        let query_norm = normalize(query);
        let candidate_norm = normalize(candidate_name);
        let search_words = significant_words(&query_norm, self.config.min_word_len);
        self.score_words(&search_words, &candidate_norm)
    }

    fn score_words(&self, search_words: &[&str], candidate_norm: &str) -> u32 {
        let cand_words = significant_words(candidate_norm, self.config.min_word_len);
        let mut score = 0;
        for sw in search_words {
            for cw in &cand_words {
                if sw == cw {
                    score += self.config.exact_word_score;
                } else if sw.contains(cw) || cw.contains(sw) {
                    score += self.config.partial_word_score;
                }
            }
        }
        score
    }
}

impl NameMatcher for TokenOverlapMatcher {
    /// Exact normalized equality only counts when the query normalizes to a
    /// non-empty string. Titles made entirely of non-ASCII letters normalize
    /// to `""` and would otherwise all be "equal"; they fall through to word
    /// scoring, where they score 0.
    fn find_best_match<'a>(
        &self,
        query: &str,
        candidates: &'a [StagingProduct],
        excluded: &HashSet<String>,
    ) -> Option<&'a StagingProduct> {
        let query_norm = normalize(query);
        let search_words = significant_words(&query_norm, self.config.min_word_len);

        let mut best: Option<(&StagingProduct, u32)> = None;

        for candidate in candidates {
            if excluded.contains(candidate.id.as_str()) {
                continue;
            }

            let candidate_norm = normalize(&candidate.name);
            if !query_norm.is_empty() && candidate_norm == query_norm {
                return Some(candidate);
            }

            let score = self.score_words(&search_words, &candidate_norm);
            if score < self.config.score_floor {
                continue;
            }
            // Strictly greater: first-seen wins ties
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((candidate, score));
            }
        }

        best.map(|(candidate, _)| candidate)
    }
}
