// src/testing.rs
// In-process stand-in for the hosted model, shared by the unit tests.
use crate::errors::VisionLabError;
use crate::services::backend::GenerativeBackend;
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub api_key: String,
    pub model: String,
    pub body: Value,
}

struct Scripted {
    result: Result<Value, VisionLabError>,
    gate: Option<Arc<Notify>>,
}

#[derive(Default)]
pub struct FakeBackend {
    scripted: Mutex<VecDeque<Scripted>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_ok(&self, response: Value) {
        self.push(Ok(response), None);
    }

    pub fn push_text(&self, text: &str) {
        self.push_ok(text_response(text));
    }

    pub fn push_err(&self, err: VisionLabError) {
        self.push(Err(err), None);
    }

    /// The matching call will not return until `gate` is notified.
    pub fn push_gated_text(&self, text: &str, gate: Arc<Notify>) {
        self.push(Ok(text_response(text)), Some(gate));
    }

    fn push(&self, result: Result<Value, VisionLabError>, gate: Option<Arc<Notify>>) {
        self.scripted
            .lock()
            .unwrap()
            .push_back(Scripted { result, gate });
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl GenerativeBackend for FakeBackend {
    async fn generate_content(
        &self,
        api_key: &str,
        model: &str,
        body: Value,
    ) -> Result<Value, VisionLabError> {
        self.calls.lock().unwrap().push(RecordedCall {
            api_key: api_key.to_string(),
            model: model.to_string(),
            body,
        });

        let next = self.scripted.lock().unwrap().pop_front();
        let Some(scripted) = next else {
            return Err(VisionLabError::ServiceCall("no scripted response".to_string()));
        };
        if let Some(gate) = scripted.gate {
            gate.notified().await;
        }
        scripted.result
    }
}

pub fn text_response(text: &str) -> Value {
    json!({
        "candidates": [
            { "content": { "role": "model", "parts": [ { "text": text } ] } }
        ]
    })
}
