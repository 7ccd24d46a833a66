use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tiku_config::Config;
use tiku_config::ocr::OcrConfig;
use tiku_ocr::TESSDATA_ENV;

fn read_config(path: &Path) -> anyhow::Result<Config> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let config = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Invalid config in {}", path.display()))?;
    Ok(config)
}

/// Load the JSON profile at `path`, or defaults with `TIKU_*` overrides
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => {
            tracing::info!("Loading config from {}", path.display());
            read_config(path)
        }
        None => {
            tracing::info!("No config file, using defaults and TIKU_* environment");
            Ok(Config::new())
        }
    }
}

/// Directory holding saved regions
pub fn data_dir(config: &Config) -> PathBuf {
    config
        .storage
        .data_dir
        .clone()
        .or_else(|| dirs::data_dir().map(|d| d.join("tiku")))
        .unwrap_or_else(|| {
            tracing::warn!("No platform data dir, saving regions to the working directory");
            PathBuf::from(".")
        })
}

/// Point the OCR engine at the configured language packs
pub fn export_tessdata(config: &OcrConfig) {
    tracing::info!("Language packs are read from {}", config.tessdata_dir.display());
    // SAFETY: only called from `main` before the runtime starts any thread
    unsafe { std::env::set_var(TESSDATA_ENV, &config.tessdata_dir) };
}
