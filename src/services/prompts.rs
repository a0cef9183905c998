// src/services/prompts.rs
use crate::models::CodeGenConfig;
use serde_json::{Value, json};

pub const CLASSIFY_INSTRUCTION: &str = r#"Analyze this image for an image classification dataset.
1. Identify the primary subject (the 'Label').
2. Estimate a confidence score (0-100) based on image clarity.
3. Provide a brief visual description useful for captioning.
4. Suggest 3-5 tags/keywords.
Return JSON."#;

/// Structured-output constraint matching `ClassificationResult`.
pub fn classification_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "label": { "type": "STRING" },
            "confidence": { "type": "NUMBER" },
            "description": { "type": "STRING" },
            "suggestedTags": {
                "type": "ARRAY",
                "items": { "type": "STRING" }
            }
        },
        "required": ["label", "confidence", "description", "suggestedTags"]
    })
}

pub fn training_script_prompt(config: &CodeGenConfig) -> String {
    let architecture = if config.use_transfer_learning {
        format!("- Base Model: {}", config.base_model)
    } else {
        "- Architecture: Custom CNN (design the network from scratch)".to_string()
    };

    format!(
        r#"Act as a senior Machine Learning Engineer.
Write a complete, runnable Python script for training an image classification model.

Specifications:
- Framework: {framework}
- Dataset Name (simulated or folder path): "{dataset}"
- Number of Classes: {classes}
- Input Image Size: {size}x{size}
- Batch Size: {batch}
- Epochs: {epochs}
- Transfer Learning: {transfer}
{architecture}

Requirements:
1. Include necessary imports.
2. Define data transformations/augmentations.
3. Define the dataset and dataloader (assume a standard folder structure 'data/train' and 'data/val').
4. Define the model architecture.
5. Define the loss function and optimizer.
6. Write the training loop with validation steps.
7. Save the best model.
8. Add comments explaining key sections.

Output ONLY the Python code. Do not output markdown backticks at the start or end.
"#,
        framework = config.framework,
        dataset = config.dataset_name,
        classes = config.num_classes,
        size = config.image_size,
        batch = config.batch_size,
        epochs = config.epochs,
        transfer = if config.use_transfer_learning { "Yes" } else { "No" },
        architecture = architecture,
    )
}
