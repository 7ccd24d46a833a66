use serde::{Deserialize, Serialize};

fn default_index_threshold() -> f64 {
    0.4
}

fn default_accept_threshold() -> f64 {
    0.5
}

fn default_min_match_char_len() -> usize {
    3
}

fn default_min_keywords() -> usize {
    2
}

fn default_keyword_ratio() -> f64 {
    0.5
}

/// Tuning for the three-tier answer lookup
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct MatchConfig {
    /// Fuzzy candidates scoring above this are never surfaced (lower is stricter)
    #[serde(default = "default_index_threshold")]
    pub index_threshold: f64,
    /// The best fuzzy candidate is trusted only below this score
    #[serde(default = "default_accept_threshold")]
    pub accept_threshold: f64,
    #[serde(default = "default_min_match_char_len")]
    pub min_match_char_len: usize,
    /// Keyword tier is skipped with fewer keywords than this; values below 2 act as 2
    #[serde(default = "default_min_keywords")]
    pub min_keywords: usize,
    #[serde(default = "default_keyword_ratio")]
    pub keyword_ratio: f64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            index_threshold: default_index_threshold(),
            accept_threshold: default_accept_threshold(),
            min_match_char_len: default_min_match_char_len(),
            min_keywords: default_min_keywords(),
            keyword_ratio: default_keyword_ratio(),
        }
    }
}
