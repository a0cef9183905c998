// src/errors.rs
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VisionLabError {
    #[error("Invalid input kind: {0}")]
    InvalidInputKind(String),

    #[error("I/O failure: {0}")]
    Io(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Service call failed: {0}")]
    ServiceCall(String),

    #[error("Response format error: {0}")]
    ResponseFormat(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<std::io::Error> for VisionLabError {
    fn from(err: std::io::Error) -> Self {
        VisionLabError::Io(err.to_string())
    }
}

impl ResponseError for VisionLabError {
    fn error_response(&self) -> HttpResponse {
        match self {
            VisionLabError::InvalidInputKind(_) => {
                HttpResponse::BadRequest().json(serde_json::json!({
                    "error": "Invalid input",
                    "message": self.to_string()
                }))
            }
            VisionLabError::Io(_) => HttpResponse::BadRequest().json(serde_json::json!({
                "error": "Upload error",
                "message": self.to_string()
            })),
            VisionLabError::Configuration(_) => {
                HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": "Configuration error",
                    "message": self.to_string()
                }))
            }
            VisionLabError::ServiceCall(_) => {
                HttpResponse::ServiceUnavailable().json(serde_json::json!({
                    "error": "AI service error",
                    "message": self.to_string()
                }))
            }
            VisionLabError::ResponseFormat(_) => {
                HttpResponse::BadGateway().json(serde_json::json!({
                    "error": "AI response error",
                    "message": self.to_string()
                }))
            }
            VisionLabError::Validation(_) => HttpResponse::BadRequest().json(serde_json::json!({
                "error": "Validation error",
                "message": self.to_string()
            })),
        }
    }
}
