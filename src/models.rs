// src/models.rs
use crate::errors::VisionLabError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Base models offered when transfer learning is enabled.
pub const BASE_MODELS: [&str; 4] = ["ResNet50", "VGG16", "MobileNetV2", "EfficientNetB0"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    /// Standard base64, without any `data:` prefix.
    pub encoded_data: String,
    pub media_type: String,
}

impl ImagePayload {
    /// Preview handle the browser can render directly.
    pub fn preview_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.encoded_data)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    pub label: String,
    pub confidence: f64,
    pub description: String,
    pub suggested_tags: Vec<String>,
}

/// What a classify call can legitimately come back with. Malformed
/// structured output is an error, not an outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassifyOutcome {
    Classified(ClassificationResult),
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Framework {
    #[serde(rename = "PyTorch")]
    PyTorch,
    #[serde(rename = "TensorFlow/Keras")]
    TensorFlow,
    #[serde(rename = "Scikit-Learn (Classic ML)")]
    ScikitLearn,
}

impl Framework {
    pub const ALL: [Framework; 3] = [
        Framework::PyTorch,
        Framework::TensorFlow,
        Framework::ScikitLearn,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Framework::PyTorch => "PyTorch",
            Framework::TensorFlow => "TensorFlow/Keras",
            Framework::ScikitLearn => "Scikit-Learn (Classic ML)",
        }
    }
}

impl fmt::Display for Framework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeGenConfig {
    pub framework: Framework,
    pub dataset_name: String,
    pub num_classes: u32,
    pub image_size: u32,
    pub batch_size: u32,
    pub epochs: u32,
    pub use_transfer_learning: bool,
    /// Only meaningful when `use_transfer_learning` is set.
    pub base_model: String,
}

impl Default for CodeGenConfig {
    fn default() -> Self {
        Self {
            framework: Framework::PyTorch,
            dataset_name: "custom_dataset".to_string(),
            num_classes: 2,
            image_size: 224,
            batch_size: 32,
            epochs: 10,
            use_transfer_learning: true,
            base_model: BASE_MODELS[0].to_string(),
        }
    }
}

/// A partial edit of the form; absent fields are left alone.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CodeGenConfigPatch {
    pub framework: Option<Framework>,
    pub dataset_name: Option<String>,
    pub num_classes: Option<u32>,
    pub image_size: Option<u32>,
    pub batch_size: Option<u32>,
    pub epochs: Option<u32>,
    pub use_transfer_learning: Option<bool>,
    pub base_model: Option<String>,
}

impl CodeGenConfigPatch {
    /// Applies the edit to `config` only if every supplied field is in range.
    pub fn apply_to(self, config: &mut CodeGenConfig) -> Result<(), VisionLabError> {
        if self.num_classes == Some(0) {
            return Err(VisionLabError::Validation(
                "numClasses must be at least 1".to_string(),
            ));
        }
        for (name, value) in [
            ("imageSize", self.image_size),
            ("batchSize", self.batch_size),
            ("epochs", self.epochs),
        ] {
            if value == Some(0) {
                return Err(VisionLabError::Validation(format!(
                    "{} must be greater than 0",
                    name
                )));
            }
        }

        if let Some(framework) = self.framework {
            config.framework = framework;
        }
        if let Some(dataset_name) = self.dataset_name {
            config.dataset_name = dataset_name;
        }
        if let Some(num_classes) = self.num_classes {
            config.num_classes = num_classes;
        }
        if let Some(image_size) = self.image_size {
            config.image_size = image_size;
        }
        if let Some(batch_size) = self.batch_size {
            config.batch_size = batch_size;
        }
        if let Some(epochs) = self.epochs {
            config.epochs = epochs;
        }
        if let Some(use_transfer_learning) = self.use_transfer_learning {
            config.use_transfer_learning = use_transfer_learning;
        }
        if let Some(base_model) = self.base_model {
            config.base_model = base_model;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct GeneratedScript(pub String);

impl GeneratedScript {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
