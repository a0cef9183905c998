// src/flows/classification.rs
use crate::errors::VisionLabError;
use crate::models::{ClassificationResult, ClassifyOutcome, ImagePayload};
use crate::services::encoder::{ImageEncoder, ImageSource};
use crate::services::Gateway;
use log::{error, info, warn};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub const INVALID_FILE_MESSAGE: &str = "Please upload a valid image file.";
pub const ANALYSIS_FAILED_MESSAGE: &str =
    "Failed to analyze image. Please try again or check your API key.";

#[derive(Debug, Clone, PartialEq)]
enum Phase {
    Idle,
    Loading,
    Success(ClassificationResult),
    Empty,
    Failed(String),
}

struct State {
    phase: Phase,
    preview: Option<String>,
    latest_request: u64,
}

/// What the browser renders for the classifier panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationView {
    pub status: &'static str,
    pub is_loading: bool,
    pub result: Option<ClassificationResult>,
    pub error: Option<String>,
    pub image_preview: Option<String>,
}

pub struct ClassificationFlow {
    gateway: Arc<Gateway>,
    encoder: ImageEncoder,
    state: Mutex<State>,
}

impl ClassificationFlow {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self {
            gateway,
            encoder: ImageEncoder::new(),
            state: Mutex::new(State {
                phase: Phase::Idle,
                preview: None,
                latest_request: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn view(&self) -> ClassificationView {
        let state = self.lock();
        let (status, result, error) = match &state.phase {
            Phase::Idle => ("idle", None, None),
            Phase::Loading => ("loading", None, None),
            Phase::Success(result) => ("success", Some(result.clone()), None),
            Phase::Empty => ("empty", None, None),
            Phase::Failed(message) => ("failed", None, Some(message.clone())),
        };

        ClassificationView {
            status,
            is_loading: state.phase == Phase::Loading,
            result,
            error,
            image_preview: state.preview.clone(),
        }
    }

    pub async fn handle_upload<S: ImageSource>(&self, source: &mut S) -> ClassificationView {
        let encoded = self.encoder.encode(source);
        self.run(encoded).await
    }

    pub async fn handle_data_url(&self, data_url: &str) -> ClassificationView {
        let encoded = self.encoder.from_data_url(data_url);
        self.run(encoded).await
    }

    async fn run(&self, encoded: Result<ImagePayload, VisionLabError>) -> ClassificationView {
        let payload = match encoded {
            Ok(payload) => payload,
            Err(e) => {
                self.reject(e);
                return self.view();
            }
        };

        let request = self.begin(&payload);
        let outcome = self.gateway.classify(&payload).await;
        drop(payload);
        self.finish(request, outcome);

        self.view()
    }

    // Never passes through Loading.
    fn reject(&self, err: VisionLabError) {
        warn!("Rejected upload: {}", err);
        let message = match err {
            VisionLabError::InvalidInputKind(_) => INVALID_FILE_MESSAGE,
            _ => ANALYSIS_FAILED_MESSAGE,
        };

        let mut state = self.lock();
        state.latest_request += 1;
        state.phase = Phase::Failed(message.to_string());
    }

    fn begin(&self, payload: &ImagePayload) -> u64 {
        let mut state = self.lock();
        state.latest_request += 1;
        state.phase = Phase::Loading;
        state.preview = Some(payload.preview_url());
        state.latest_request
    }

    fn finish(&self, request: u64, outcome: Result<ClassifyOutcome, VisionLabError>) {
        let mut state = self.lock();
        if request != state.latest_request {
            warn!(
                "Discarding classification #{} superseded by #{}",
                request, state.latest_request
            );
            return;
        }

        state.phase = match outcome {
            Ok(ClassifyOutcome::Classified(result)) => {
                info!(
                    "Classified as '{}' ({}%)",
                    result.label, result.confidence
                );
                Phase::Success(result)
            }
            Ok(ClassifyOutcome::Empty) => Phase::Empty,
            Err(e) => {
                error!("Image classification failed: {}", e);
                Phase::Failed(ANALYSIS_FAILED_MESSAGE.to_string())
            }
        };
    }
}
