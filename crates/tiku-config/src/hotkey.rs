use serde::{Deserialize, Serialize};

fn default_enabled() -> bool {
    true
}

fn default_category() -> String {
    "exam".to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct HotkeyConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Category the global shortcuts act on
    #[serde(default = "default_category")]
    pub category: String,
}

impl Default for HotkeyConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            category: default_category(),
        }
    }
}
