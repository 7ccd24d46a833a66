use std::fmt;

use serde::{Deserialize, Serialize};

/// Named knowledge-base partition such as `exam` or `maze`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Category(String);

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name of the persisted region for this category
    pub fn region_file_name(&self) -> String {
        format!("{}-region-data.json", self.0)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Category {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Category {
    fn from(name: String) -> Self {
        Self(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionItem {
    pub text: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub recommend: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnswerPayload {
    Simple {
        text: String,
    },
    OptionList {
        /// Optional tag shown next to the question (e.g. the maze name)
        label: Option<String>,
        options: Vec<OptionItem>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    pub question: String,
    pub answer: AnswerPayload,
    pub category: Category,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchTier {
    Exact,
    Fuzzy,
    Keyword,
}

impl MatchTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchTier::Exact => "exact",
            MatchTier::Fuzzy => "fuzzy",
            MatchTier::Keyword => "keyword",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub entry: KnowledgeEntry,
    pub tier: MatchTier,
}

/// What gets presented after a recognize pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Answer {
    Found(MatchResult),
    /// Nothing matched; the normalized text is echoed so the user can judge
    /// recognition quality
    NotFound { echoed_text: String },
}
