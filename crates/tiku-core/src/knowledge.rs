use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use tiku_config::storage::StorageConfig;
use tiku_types::{AnswerPayload, Category, KnowledgeEntry, OptionItem};

use crate::error::KnowledgeError;
use crate::preprocess::normalize;

// The three entry shapes found in question-bank files
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawEntry {
    Options {
        #[serde(alias = "question")]
        q: String,
        #[serde(default)]
        maze: Option<String>,
        options: Vec<OptionItem>,
    },
    Simple {
        #[serde(alias = "q")]
        question: String,
        #[serde(alias = "a")]
        answer: String,
    },
}

impl RawEntry {
    fn into_entry(self, category: &Category) -> KnowledgeEntry {
        match self {
            RawEntry::Options { q, maze, options } => KnowledgeEntry {
                question: q,
                answer: AnswerPayload::OptionList {
                    label: maze,
                    options,
                },
                category: category.clone(),
            },
            RawEntry::Simple { question, answer } => KnowledgeEntry {
                question,
                answer: AnswerPayload::Simple { text: answer },
                category: category.clone(),
            },
        }
    }
}

/// Read-only question bank for one category
#[derive(Debug, Clone)]
pub struct Corpus {
    category: Category,
    entries: Vec<KnowledgeEntry>,
    normalized: Vec<String>,
}

impl Corpus {
    pub fn new(category: Category, entries: Vec<KnowledgeEntry>) -> Self {
        let normalized = entries.iter().map(|e| normalize(&e.question)).collect();
        Self {
            category,
            entries,
            normalized,
        }
    }

    pub fn empty(category: Category) -> Self {
        Self::new(category, Vec::new())
    }

    /// Parse a question-bank JSON array. Entries that fit none of the known
    /// shapes are skipped.
    pub fn from_json_str(category: Category, json: &str) -> Result<Self, KnowledgeError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let serde_json::Value::Array(items) = value else {
            return Err(KnowledgeError::NotAnArray);
        };

        let mut entries = Vec::with_capacity(items.len());
        for (idx, item) in items.into_iter().enumerate() {
            match serde_json::from_value::<RawEntry>(item) {
                Ok(raw) => entries.push(raw.into_entry(&category)),
                Err(e) => {
                    tracing::warn!("Skipping {category} entry #{idx}: {e}");
                }
            }
        }

        Ok(Self::new(category, entries))
    }

    /// Load a question bank from disk. Missing or broken files give an empty
    /// corpus so lookups simply miss.
    pub async fn load(category: Category, path: &Path) -> Self {
        tracing::info!("Loading {category} questions from: {}", path.display());

        let json = match tokio::fs::read_to_string(path).await {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!("No {category} questions at {}: {e}", path.display());
                return Self::empty(category);
            }
        };

        match Self::from_json_str(category.clone(), &json) {
            Ok(corpus) => {
                tracing::info!("Loaded {} {category} questions", corpus.len());
                corpus
            }
            Err(e) => {
                tracing::warn!("Failed to parse {}: {e}", path.display());
                Self::empty(category)
            }
        }
    }

    pub fn category(&self) -> &Category {
        &self.category
    }

    pub fn entries(&self) -> &[KnowledgeEntry] {
        &self.entries
    }

    /// Question text of entry `idx` after [`normalize`]
    pub fn normalized_question(&self, idx: usize) -> &str {
        &self.normalized[idx]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// All loaded corpora, one per category
#[derive(Debug, Default, Clone)]
pub struct KnowledgeBase {
    corpora: HashMap<Category, Arc<Corpus>>,
}

impl KnowledgeBase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every category listed in the storage config
    pub async fn load(storage: &StorageConfig) -> Self {
        let mut kb = Self::new();
        for (name, path) in storage.knowledge_files() {
            let corpus = Corpus::load(Category::from(name), &path).await;
            kb.insert(corpus);
        }
        kb
    }

    pub fn insert(&mut self, corpus: Corpus) {
        self.corpora
            .insert(corpus.category().clone(), Arc::new(corpus));
    }

    /// Corpus for `category`; unknown categories get an empty one
    pub fn corpus(&self, category: &Category) -> Arc<Corpus> {
        self.corpora
            .get(category)
            .cloned()
            .unwrap_or_else(|| Arc::new(Corpus::empty(category.clone())))
    }
}
