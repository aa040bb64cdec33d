//! Configuration management for the herald system

use crate::error::{HeraldError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeraldConfig {
    pub telegram: TelegramConfig,
    pub twitter: TwitterConfig,
    pub model: ModelConfig,

    #[serde(default)]
    pub knowledge: KnowledgeConfig,

    #[serde(default)]
    pub approvals: ApprovalConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    pub bot_token: String,

    /// Chat that receives approval requests and may decide them.
    #[serde(alias = "chat_id")]
    pub admin_chat_id: String,

    #[serde(default = "default_poll_timeout_secs")]
    pub poll_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwitterConfig {
    pub bearer_token: String,

    /// Numeric id of the posting account, used for follower lookups.
    /// Empty disables mention decoration.
    #[serde(default)]
    pub user_id: String,

    #[serde(alias = "url", default = "default_twitter_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub model: String,

    /// OpenAI-compatible endpoint of the local model runtime.
    #[serde(default = "default_model_base_url")]
    pub base_url: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    #[serde(default = "default_knowledge_path")]
    pub path: PathBuf,

    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            path: default_knowledge_path(),
            similarity_threshold: default_similarity_threshold(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalConfig {
    /// Pending records older than this are expired by the sweeper.
    #[serde(default = "default_max_age_secs")]
    pub max_age_secs: u64,

    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    /// Directory for the durable approval spool. None keeps approvals
    /// in memory only; they are lost on restart.
    #[serde(default)]
    pub spool_dir: Option<PathBuf>,
}

impl Default for ApprovalConfig {
    fn default() -> Self {
        Self {
            max_age_secs: default_max_age_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
            spool_dir: None,
        }
    }
}

fn default_poll_timeout_secs() -> u64 {
    30
}

fn default_twitter_base_url() -> String {
    "https://api.twitter.com".to_string()
}

fn default_model_base_url() -> String {
    "http://127.0.0.1:8080/v1".to_string()
}

fn default_max_tokens() -> u32 {
    512
}

fn default_knowledge_path() -> PathBuf {
    PathBuf::from("knowledge_base.json")
}

fn default_similarity_threshold() -> f64 {
    0.3
}

fn default_max_age_secs() -> u64 {
    86400
}

fn default_sweep_interval_secs() -> u64 {
    60
}

impl HeraldConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| HeraldError::Config(format!("Failed to read config file: {}", e)))?;

        Self::from_json_str(&content)
    }

    /// Load configuration from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: HeraldConfig = serde_json::from_str(json)
            .map_err(|e| HeraldError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.telegram.bot_token.is_empty() {
            return Err(HeraldError::Config(
                "Telegram bot token is required".to_string(),
            ));
        }

        if self.telegram.admin_chat_id.is_empty() {
            return Err(HeraldError::Config(
                "Telegram admin chat id is required".to_string(),
            ));
        }

        if self.twitter.bearer_token.is_empty() {
            return Err(HeraldError::Config(
                "Twitter bearer token is required".to_string(),
            ));
        }

        if self.model.model.is_empty() {
            return Err(HeraldError::Config("Model name is required".to_string()));
        }

        if !(0.0..=1.0).contains(&self.knowledge.similarity_threshold) {
            return Err(HeraldError::Config(format!(
                "Similarity threshold must be within [0, 1], got {}",
                self.knowledge.similarity_threshold
            )));
        }

        Ok(())
    }
}
