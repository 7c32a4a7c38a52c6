use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use tabsift_classify::LlmAssist;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub assist: AssistSection,
    pub storage: StorageSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistSection {
    pub enabled: bool,
    pub base_url: String,
    pub model: String,
    /// Environment variable holding the API key; never stored in the file.
    pub api_key_env: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSection {
    pub out_dir: String,
    pub owner: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            assist: AssistSection {
                enabled: false,
                base_url: "https://api.openai.com".to_string(),
                model: "gpt-4o-mini".to_string(),
                api_key_env: "OPENAI_API_KEY".to_string(),
                timeout_secs: 20,
            },
            storage: StorageSection {
                out_dir: "./datasets".to_string(),
                owner: "local".to_string(),
            },
        }
    }
}

impl AssistSection {
    /// Build the assist client, or `None` when disabled or unconfigured;
    /// the pipeline then runs deterministically.
    pub fn build(&self) -> Option<LlmAssist> {
        if !self.enabled {
            return None;
        }
        let api_key = std::env::var(&self.api_key_env).ok().filter(|k| !k.is_empty())?;
        Some(LlmAssist::new(
            &self.base_url,
            &self.model,
            api_key,
            Duration::from_secs(self.timeout_secs),
        ))
    }
}

pub fn tabsift_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".tabsift"))
}

pub fn ensure_tabsift_home() -> Result<PathBuf> {
    let dir = tabsift_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_tabsift_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    Ok(toml::from_str(&s).context("parse config.toml")?)
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}
