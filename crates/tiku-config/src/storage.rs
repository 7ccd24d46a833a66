use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

fn default_knowledge_dir() -> PathBuf {
    PathBuf::from("questions")
}

fn default_categories() -> Vec<CategoryConfig> {
    vec![
        CategoryConfig {
            name: "exam".to_string(),
            knowledge_file: "qna.json".to_string(),
        },
        CategoryConfig {
            name: "maze".to_string(),
            knowledge_file: "maze.json".to_string(),
        },
    ]
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CategoryConfig {
    pub name: String,
    /// File name inside `knowledge_dir`
    pub knowledge_file: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    /// Where region files live; the platform data dir is used when unset
    pub data_dir: Option<PathBuf>,
    #[serde(default = "default_knowledge_dir")]
    pub knowledge_dir: PathBuf,
    #[serde(default = "default_categories")]
    pub categories: Vec<CategoryConfig>,
}

impl StorageConfig {
    pub fn new() -> Self {
        let data_dir = env::var("TIKU_DATA_DIR").ok().map(PathBuf::from);

        let knowledge_dir = env::var("TIKU_KNOWLEDGE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_knowledge_dir());

        Self {
            data_dir,
            knowledge_dir,
            categories: default_categories(),
        }
    }

    /// Path of the knowledge file for every configured category
    pub fn knowledge_files(&self) -> impl Iterator<Item = (&str, PathBuf)> {
        self.categories
            .iter()
            .map(|c| (c.name.as_str(), self.knowledge_dir.join(&c.knowledge_file)))
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            knowledge_dir: default_knowledge_dir(),
            categories: default_categories(),
        }
    }
}
