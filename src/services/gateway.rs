// src/services/gateway.rs
use crate::config::GatewayConfig;
use crate::errors::VisionLabError;
use crate::models::*;
use crate::services::backend::{GenerativeBackend, response_text};
use crate::services::fences::strip_code_fences;
use crate::services::prompts::{CLASSIFY_INSTRUCTION, classification_schema, training_script_prompt};
use log::{debug, info};
use serde_json::json;
use std::sync::Arc;

pub struct Gateway {
    config: GatewayConfig,
    backend: Arc<dyn GenerativeBackend>,
}

impl Gateway {
    pub fn new(config: GatewayConfig, backend: Arc<dyn GenerativeBackend>) -> Self {
        Self { config, backend }
    }

    fn credential(&self) -> Result<&str, VisionLabError> {
        self.config
            .api_key
            .as_deref()
            .ok_or_else(|| VisionLabError::Configuration("missing credential".to_string()))
    }

    pub async fn classify(&self, payload: &ImagePayload) -> Result<ClassifyOutcome, VisionLabError> {
        let api_key = self.credential()?;

        let body = json!({
            "contents": [{
                "parts": [
                    {
                        "inlineData": {
                            "mimeType": payload.media_type,
                            "data": payload.encoded_data
                        }
                    },
                    { "text": CLASSIFY_INSTRUCTION }
                ]
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": classification_schema()
            }
        });

        info!(
            "Classifying {} image with {}",
            payload.media_type, self.config.classify_model
        );
        let response = self
            .backend
            .generate_content(api_key, &self.config.classify_model, body)
            .await?;

        match response_text(&response) {
            Some(text) => parse_classification(&text).map(ClassifyOutcome::Classified),
            None => {
                debug!("Classification response carried no content");
                Ok(ClassifyOutcome::Empty)
            }
        }
    }

    pub async fn generate_training_script(
        &self,
        config: &CodeGenConfig,
    ) -> Result<GeneratedScript, VisionLabError> {
        let api_key = self.credential()?;

        let body = json!({
            "contents": [{
                "parts": [ { "text": training_script_prompt(config) } ]
            }]
        });

        info!(
            "Generating {} training script for '{}' with {}",
            config.framework, config.dataset_name, self.config.codegen_model
        );
        let response = self
            .backend
            .generate_content(api_key, &self.config.codegen_model, body)
            .await?;

        let text = response_text(&response).ok_or_else(|| {
            VisionLabError::ResponseFormat("Code generation returned no text".to_string())
        })?;

        Ok(GeneratedScript(strip_code_fences(&text).to_string()))
    }
}

pub fn parse_classification(text: &str) -> Result<ClassificationResult, VisionLabError> {
    serde_json::from_str(text)
        .map_err(|e| VisionLabError::ResponseFormat(format!("Failed to parse classification JSON: {}", e)))
}
