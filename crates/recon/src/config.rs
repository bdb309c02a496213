use serde::{Deserialize, Serialize};

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Match thresholds
// ---------------------------------------------------------------------------

/// Thresholds for the token-overlap name matcher.
///
/// The defaults are empirical: words shorter than three characters are
/// ignored, an exact word hit scores 10, a substring hit scores 5, and a
/// candidate must reach 10 to be selected at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    pub min_word_len: usize,
    pub score_floor: u32,
    pub exact_word_score: u32,
    pub partial_word_score: u32,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            min_word_len: 3,
            score_floor: 10,
            exact_word_score: 10,
            partial_word_score: 5,
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl MatchConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: MatchConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.min_word_len == 0 {
            return Err(ReconError::ConfigValidation(
                "min_word_len must be at least 1".into(),
            ));
        }
        if self.score_floor == 0 {
            return Err(ReconError::ConfigValidation(
                "score_floor must be at least 1".into(),
            ));
        }
        if self.exact_word_score < self.partial_word_score {
            return Err(ReconError::ConfigValidation(format!(
                "exact_word_score ({}) must not be lower than partial_word_score ({})",
                self.exact_word_score, self.partial_word_score
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_uses_defaults() {
        let config = MatchConfig::from_toml("").unwrap();
        assert_eq!(config, MatchConfig::default());
    }

    #[test]
    fn partial_override() {
        let config = MatchConfig::from_toml("score_floor = 15\nmin_word_len = 4\n").unwrap();
        assert_eq!(config.score_floor, 15);
        assert_eq!(config.min_word_len, 4);
        assert_eq!(config.exact_word_score, 10);
    }

    #[test]
    fn rejects_zero_floor() {
        let err = MatchConfig::from_toml("score_floor = 0").unwrap_err();
        assert!(matches!(err, ReconError::ConfigValidation(_)));
    }

    #[test]
    fn rejects_inverted_weights() {
        let err = MatchConfig::from_toml("exact_word_score = 2\npartial_word_score = 5").unwrap_err();
        assert!(err.to_string().contains("exact_word_score"));
    }

    #[test]
    fn rejects_bad_type() {
        let err = MatchConfig::from_toml("score_floor = \"ten\"").unwrap_err();
        assert!(matches!(err, ReconError::ConfigParse(_)));
    }
}
