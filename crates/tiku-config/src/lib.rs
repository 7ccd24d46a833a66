use serde::{Deserialize, Serialize};

use self::hotkey::HotkeyConfig;
use self::matching::MatchConfig;
use self::ocr::OcrConfig;
use self::session::SessionConfig;
use self::storage::StorageConfig;

pub mod hotkey;
pub mod matching;
pub mod ocr;
pub mod session;
pub mod storage;

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub ocr: OcrConfig,
    pub matching: MatchConfig,
    pub session: SessionConfig,
    pub storage: StorageConfig,
    pub hotkey: HotkeyConfig,
}

impl Config {
    /// Defaults overridden by `TIKU_*` environment variables
    pub fn new() -> Self {
        Config {
            ocr: OcrConfig::new(),
            matching: MatchConfig::default(),
            session: SessionConfig::new(),
            storage: StorageConfig::new(),
            hotkey: HotkeyConfig::default(),
        }
    }
}
