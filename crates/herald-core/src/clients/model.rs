//! Client for the local language-model runtime
//!
//! Talks to an OpenAI-compatible completion endpoint served by the
//! local runtime. Constructed once at startup and shared by reference;
//! callers never re-initialize it per request.

use crate::config::ModelConfig;
use crate::error::{HeraldError, Result};
use crate::workflow::traits::TextGenerator;
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde_json::json;
use std::time::Duration;

pub struct ModelClient {
    base_url: String,
    model: String,
    max_tokens: u32,
    http_client: HttpClient,
}

impl ModelClient {
    pub fn new(config: ModelConfig) -> Result<Self> {
        // Local generation can be slow; give it a generous bound.
        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(HeraldError::Http)?;

        Ok(Self {
            base_url: config.base_url,
            model: config.model,
            max_tokens: config.max_tokens,
            http_client,
        })
    }

    /// Probe the runtime so a dead model server surfaces at startup
    /// instead of on the first user question.
    pub async fn warm_up(&self) -> Result<()> {
        let url = format!("{}/models", self.base_url);

        let response = self.http_client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(HeraldError::ServiceUnavailable(format!(
                "Model runtime returned {} during warm-up",
                response.status()
            )));
        }

        log::info!("Model runtime ready at {}", self.base_url);
        Ok(())
    }
}

#[async_trait]
impl TextGenerator for ModelClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .http_client
            .post(&url)
            .json(&json!({
                "model": self.model,
                "messages": [
                    {"role": "user", "content": prompt}
                ],
                "max_tokens": self.max_tokens,
                "temperature": 0.7
            }))
            .send()
            .await
            .map_err(|e| HeraldError::Generation(e.to_string()))?;

        if !response.status().is_success() {
            return Err(HeraldError::Generation(format!(
                "Model runtime returned {}",
                response.status()
            )));
        }

        let result: serde_json::Value = response
            .json()
            .await
            .map_err(|e| HeraldError::Generation(e.to_string()))?;

        let content = result["choices"][0]["message"]["content"]
            .as_str()
            .map(str::trim)
            .unwrap_or_default();

        if content.is_empty() {
            return Err(HeraldError::Generation(
                "Model returned an empty completion".to_string(),
            ));
        }

        Ok(content.to_string())
    }
}
