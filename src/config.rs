use crate::error::{FabricMapError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Persisted defaults for the CLI. Anything set here can still be
/// overridden per invocation with command-line flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Chat model used by the cleaning stage.
    pub model: String,
    /// OpenAI-compatible endpoint base URL (local Ollama by default).
    pub endpoint: String,
    /// Optional API key for hosted endpoints; Ollama ignores it.
    pub api_key: Option<String>,
    /// Request timeout for a single chat call.
    pub timeout_seconds: u64,
    /// Exact-variant knowledge base (category -> known label spellings).
    pub exact_library: String,
    /// Category catalog (taxonomy groups + flat category list).
    pub catalog: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: "qwen3:14b".into(),
            endpoint: "http://localhost:11434/v1".into(),
            api_key: None,
            timeout_seconds: 120,
            exact_library: "mainlib.json".into(),
            catalog: "mappingLib.json".into(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| FabricMapError::Config("home directory not found".into()))?;
        Ok(home.join(".config").join("fabric-map").join("config.json"))
    }

    /// Environment variable wins over the stored key.
    pub fn get_api_key(&self) -> Option<String> {
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            if !key.is_empty() {
                return Some(key);
            }
        }
        self.api_key.clone()
    }

    pub fn set_model(&mut self, model: String) -> Result<()> {
        self.model = model;
        self.save()
    }

    pub fn set_endpoint(&mut self, endpoint: String) -> Result<()> {
        self.endpoint = endpoint;
        self.save()
    }

    pub fn set_api_key(&mut self, key: String) -> Result<()> {
        self.api_key = Some(key);
        self.save()
    }
}
