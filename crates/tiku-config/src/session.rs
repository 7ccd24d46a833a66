use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

fn default_settle_delay_ms() -> u64 {
    200
}

fn default_answer_dismiss_ms() -> u64 {
    8000
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    /// Wait between hiding the main surface and opening the selection overlay
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    /// How long a presented answer stays up
    #[serde(default = "default_answer_dismiss_ms")]
    pub answer_dismiss_ms: u64,
}

impl SessionConfig {
    pub fn new() -> Self {
        let settle_delay_ms = env::var("TIKU_SETTLE_DELAY_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_settle_delay_ms);

        let answer_dismiss_ms = env::var("TIKU_ANSWER_DISMISS_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_answer_dismiss_ms);

        Self {
            settle_delay_ms,
            answer_dismiss_ms,
        }
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn answer_dismiss(&self) -> Duration {
        Duration::from_millis(self.answer_dismiss_ms)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: default_settle_delay_ms(),
            answer_dismiss_ms: default_answer_dismiss_ms(),
        }
    }
}
