use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use tajiri_functions::{LlmClient, Provider};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub llm: LlmSection,
    pub scheduler: SchedulerSection,
    pub advisor: AdvisorSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSection {
    pub provider: String,
    pub model: String,
    /// Name of the environment variable holding the API key. The key itself
    /// never lives in the config file.
    pub api_key_env: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerSection {
    pub concurrency: usize,
    pub goal_timeout_secs: u64,
    pub retention_days: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisorSection {
    pub max_context_transactions: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm: LlmSection {
                provider: "gemini".to_string(),
                model: "gemini-2.5-flash".to_string(),
                api_key_env: "GEMINI_API_KEY".to_string(),
            },
            scheduler: SchedulerSection {
                concurrency: 8,
                goal_timeout_secs: 30,
                retention_days: tajiri_functions::DEFAULT_RETENTION_DAYS,
            },
            advisor: AdvisorSection {
                max_context_transactions: 50,
            },
        }
    }
}

pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join("config.toml")
}

pub fn load_config(data_dir: &Path) -> Result<Config> {
    let p = config_path(data_dir);
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    Ok(toml::from_str(&s).context("parse config.toml")?)
}

pub fn save_config(data_dir: &Path, cfg: &Config) -> Result<()> {
    let p = config_path(data_dir);
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config(data_dir: &Path) -> Result<()> {
    let p = config_path(data_dir);
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(data_dir, &Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

/// Build the LLM client when the configured key is present in the
/// environment. A missing key is not an error: handlers that need a model
/// say so themselves, everything else runs without one.
pub fn llm_client(cfg: &Config) -> Result<Option<LlmClient>> {
    let Ok(key) = std::env::var(&cfg.llm.api_key_env) else {
        return Ok(None);
    };
    let provider = Provider::from_name(&cfg.llm.provider)?;
    Ok(Some(LlmClient::new(provider, &cfg.llm.model, key)))
}
