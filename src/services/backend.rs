// src/services/backend.rs
use crate::config::GatewayConfig;
use crate::errors::VisionLabError;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

/// Transport to the hosted generative model. The gateway builds request
/// bodies; a backend only delivers them.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    async fn generate_content(
        &self,
        api_key: &str,
        model: &str,
        body: Value,
    ) -> Result<Value, VisionLabError>;
}

pub struct GeminiBackend {
    api_base: String,
    client: Client,
}

impl GeminiBackend {
    pub fn new(config: &GatewayConfig) -> Result<Self, VisionLabError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| VisionLabError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self {
            api_base: config.api_base.clone(),
            client,
        })
    }
}

#[async_trait]
impl GenerativeBackend for GeminiBackend {
    async fn generate_content(
        &self,
        api_key: &str,
        model: &str,
        body: Value,
    ) -> Result<Value, VisionLabError> {
        let url = format!("{}/v1beta/models/{}:generateContent", self.api_base, model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            // without_url keeps query strings out of the message
            .map_err(|e| VisionLabError::ServiceCall(format!("Gemini request failed: {}", e.without_url())))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(VisionLabError::ServiceCall(format!(
                "Gemini error ({}): {}",
                status, error_text
            )));
        }

        response
            .json()
            .await
            .map_err(|e| VisionLabError::ResponseFormat(format!("Failed to parse Gemini response: {}", e)))
    }
}

/// Concatenated text of the first candidate, or `None` when the model
/// produced nothing usable.
pub fn response_text(response: &Value) -> Option<String> {
    let parts = response["candidates"][0]["content"]["parts"].as_array()?;
    let text: String = parts.iter().filter_map(|p| p["text"].as_str()).collect();

    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}
