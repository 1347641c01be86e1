//! Bot config loader (strict parsing).

pub mod schema;

use std::fs;

use chatbot_core::error::{ChatError, Result};

pub use schema::{BotConfig, TransportSection};

pub fn load_from_file(path: &str) -> Result<BotConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| ChatError::BadConfig(format!("read config {path} failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<BotConfig> {
    let cfg: BotConfig = serde_yaml::from_str(s)
        .map_err(|e| ChatError::BadConfig(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
