// src/flows/codegen.rs
use crate::errors::VisionLabError;
use crate::models::{CodeGenConfig, CodeGenConfigPatch, GeneratedScript};
use crate::services::Gateway;
use log::{error, info, warn};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub const GENERATION_FAILED_SCRIPT: &str =
    "# Error generating code. Please check API key and try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeGenStatus {
    Idle,
    Generating,
    Ready,
    Failed,
}

struct State {
    config: CodeGenConfig,
    status: CodeGenStatus,
    script: Option<GeneratedScript>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeGenView {
    pub status: CodeGenStatus,
    pub is_generating: bool,
    pub config: CodeGenConfig,
    pub script: Option<GeneratedScript>,
}

#[derive(Debug)]
pub enum GenerateOutcome {
    Finished(CodeGenView),
    /// A generation was already running; nothing was started.
    Busy(CodeGenView),
}

pub struct CodeGenFlow {
    gateway: Arc<Gateway>,
    state: Mutex<State>,
}

impl CodeGenFlow {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self::with_config(gateway, CodeGenConfig::default())
    }

    pub fn with_config(gateway: Arc<Gateway>, config: CodeGenConfig) -> Self {
        Self {
            gateway,
            state: Mutex::new(State {
                config,
                status: CodeGenStatus::Idle,
                script: None,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn view(&self) -> CodeGenView {
        let state = self.lock();
        CodeGenView {
            status: state.status,
            is_generating: state.status == CodeGenStatus::Generating,
            config: state.config.clone(),
            script: state.script.clone(),
        }
    }

    pub fn script(&self) -> Option<GeneratedScript> {
        self.lock().script.clone()
    }

    /// Edits are accepted in every state, including while generating.
    pub fn update_config(&self, patch: CodeGenConfigPatch) -> Result<CodeGenView, VisionLabError> {
        patch.apply_to(&mut self.lock().config)?;
        Ok(self.view())
    }

    pub async fn generate(&self) -> GenerateOutcome {
        let (snapshot, previous) = {
            let mut state = self.lock();
            if state.status == CodeGenStatus::Generating {
                drop(state);
                warn!("Generation already running; ignoring trigger");
                return GenerateOutcome::Busy(self.view());
            }
            let previous = state.status;
            state.status = CodeGenStatus::Generating;
            (state.config.clone(), previous)
        };

        let mut guard = GeneratingGuard {
            flow: self,
            previous,
            armed: true,
        };
        let result = self.gateway.generate_training_script(&snapshot).await;
        guard.armed = false;

        {
            let mut state = self.lock();
            match result {
                Ok(script) => {
                    info!("Generated training script ({} bytes)", script.as_str().len());
                    state.status = CodeGenStatus::Ready;
                    state.script = Some(script);
                }
                Err(e) => {
                    error!("Training script generation failed: {}", e);
                    state.status = CodeGenStatus::Failed;
                    state.script = Some(GeneratedScript(GENERATION_FAILED_SCRIPT.to_string()));
                }
            }
        }

        GenerateOutcome::Finished(self.view())
    }
}

// Puts the status back if `generate` is dropped while the call is in flight.
struct GeneratingGuard<'a> {
    flow: &'a CodeGenFlow,
    previous: CodeGenStatus,
    armed: bool,
}

impl Drop for GeneratingGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        warn!("Training script generation cancelled before the service answered");
        let mut state = self.flow.lock();
        if state.status == CodeGenStatus::Generating {
            state.status = self.previous;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GatewayConfig;
    use crate::models::Framework;
    use crate::testing::FakeBackend;
    use futures_util::FutureExt;
    use tokio::sync::Notify;

    fn flowers() -> CodeGenConfig {
        CodeGenConfig {
            framework: Framework::PyTorch,
            dataset_name: "flowers".to_string(),
            num_classes: 5,
            image_size: 224,
            batch_size: 32,
            epochs: 10,
            use_transfer_learning: true,
            base_model: "ResNet50".to_string(),
        }
    }

    fn flow(api_key: Option<&str>, backend: Arc<FakeBackend>) -> CodeGenFlow {
        let config = GatewayConfig::with_api_key(api_key.map(str::to_string));
        CodeGenFlow::with_config(Arc::new(Gateway::new(config, backend)), flowers())
    }

    fn finished(outcome: GenerateOutcome) -> CodeGenView {
        match outcome {
            GenerateOutcome::Finished(view) => view,
            GenerateOutcome::Busy(_) => panic!("generation unexpectedly busy"),
        }
    }

    #[actix_web::test]
    async fn new_flow_uses_form_defaults() {
        let view = CodeGenFlow::new(Arc::new(Gateway::new(
            GatewayConfig::with_api_key(None),
            FakeBackend::new(),
        )))
        .view();

        assert_eq!(view.status, CodeGenStatus::Idle);
        assert_eq!(view.config, CodeGenConfig::default());
        assert!(view.script.is_none());
    }

    #[actix_web::test]
    async fn fenced_response_is_displayed_without_fences() {
        let backend = FakeBackend::new();
        backend.push_text("```python\ncode_here\n```");
        let flow = flow(Some("key"), backend.clone());

        let view = finished(flow.generate().await);

        assert_eq!(view.status, CodeGenStatus::Ready);
        assert_eq!(view.script.unwrap().as_str(), "code_here\n");
        assert_eq!(backend.call_count(), 1);
    }

    #[actix_web::test]
    async fn failure_replaces_the_previous_script() {
        let backend = FakeBackend::new();
        backend.push_text("print('first')\n");
        backend.push_err(VisionLabError::ServiceCall("503".to_string()));
        let flow = flow(Some("key"), backend);

        finished(flow.generate().await);
        let view = finished(flow.generate().await);

        assert_eq!(view.status, CodeGenStatus::Failed);
        assert_eq!(view.script.unwrap().as_str(), GENERATION_FAILED_SCRIPT);
    }

    #[actix_web::test]
    async fn missing_credential_yields_placeholder_without_network() {
        let backend = FakeBackend::new();
        let flow = flow(None, backend.clone());

        let view = finished(flow.generate().await);

        assert_eq!(view.script.unwrap().as_str(), GENERATION_FAILED_SCRIPT);
        assert_eq!(backend.call_count(), 0);
    }

    #[actix_web::test]
    async fn trigger_is_ignored_while_generating_but_config_stays_editable() {
        let backend = FakeBackend::new();
        let gate = Arc::new(Notify::new());
        backend.push_gated_text("print(1)\n", gate.clone());
        let flow = flow(Some("key"), backend.clone());

        let (first, _) = tokio::join!(flow.generate(), async {
            assert!(flow.view().is_generating);
            assert!(matches!(flow.generate().await, GenerateOutcome::Busy(_)));

            let patch = CodeGenConfigPatch {
                epochs: Some(20),
                ..Default::default()
            };
            assert_eq!(flow.update_config(patch).unwrap().config.epochs, 20);
            gate.notify_one();
        });

        let view = finished(first);
        assert_eq!(view.status, CodeGenStatus::Ready);
        assert_eq!(view.config.epochs, 20);
        assert_eq!(backend.call_count(), 1);

        // The call used the configuration as it was when triggered.
        let calls = backend.calls();
        let prompt = calls[0].body["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(prompt.contains("Epochs: 10"));
    }

    #[actix_web::test]
    async fn invalid_edit_is_rejected() {
        let flow = flow(Some("key"), FakeBackend::new());
        let patch = CodeGenConfigPatch {
            image_size: Some(0),
            ..Default::default()
        };

        assert!(flow.update_config(patch).is_err());
        assert_eq!(flow.view().config.image_size, 224);
    }

    #[actix_web::test]
    async fn dropped_generation_releases_the_trigger() {
        let backend = FakeBackend::new();
        backend.push_gated_text("print('never')\n", Arc::new(Notify::new()));
        backend.push_text("print('second')\n");
        let flow = flow(Some("key"), backend.clone());

        // Polled once, parked on the gate, then dropped.
        assert!(flow.generate().now_or_never().is_none());
        let view = flow.view();
        assert_eq!(view.status, CodeGenStatus::Idle);
        assert!(!view.is_generating);

        let view = finished(flow.generate().await);
        assert_eq!(view.status, CodeGenStatus::Ready);
        assert_eq!(view.script.unwrap().as_str(), "print('second')\n");
        assert_eq!(backend.call_count(), 2);
    }

    #[actix_web::test]
    async fn dropped_generation_keeps_the_previous_script() {
        let backend = FakeBackend::new();
        backend.push_text("print('first')\n");
        backend.push_gated_text("print('never')\n", Arc::new(Notify::new()));
        let flow = flow(Some("key"), backend);

        finished(flow.generate().await);
        assert!(flow.generate().now_or_never().is_none());

        let view = flow.view();
        assert_eq!(view.status, CodeGenStatus::Ready);
        assert_eq!(view.script.unwrap().as_str(), "print('first')\n");
    }
}
