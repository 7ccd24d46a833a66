use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

fn default_language() -> String {
    "chi_sim".to_string()
}

fn default_tessdata_dir() -> PathBuf {
    PathBuf::from("assets/tessdata/lang")
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct OcrConfig {
    #[serde(default = "default_language")]
    pub language: String,
    /// Directory holding the `<language>.traineddata` pack
    #[serde(default = "default_tessdata_dir")]
    pub tessdata_dir: PathBuf,
    /// Unset means recognition may take as long as the engine needs
    pub recognition_timeout_ms: Option<u64>,
}

impl OcrConfig {
    pub fn new() -> Self {
        let tessdata_dir = env::var("TIKU_TESSDATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_tessdata_dir());

        let recognition_timeout_ms = env::var("TIKU_RECOGNITION_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok());

        Self {
            language: default_language(),
            tessdata_dir,
            recognition_timeout_ms,
        }
    }

    pub fn recognition_timeout(&self) -> Option<Duration> {
        self.recognition_timeout_ms.map(Duration::from_millis)
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            tessdata_dir: default_tessdata_dir(),
            recognition_timeout_ms: None,
        }
    }
}
