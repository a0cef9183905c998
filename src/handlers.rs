// src/handlers.rs
use crate::flows::codegen::GenerateOutcome;
use crate::services::encoder::UploadedFile;
use crate::{AppState, errors::VisionLabError, models::*};
use actix_multipart::Multipart;
use actix_web::{Error, HttpResponse, http::header, web};
use futures_util::TryStreamExt;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataUrlUpload {
    pub data_url: String,
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/classify", web::post().to(classify_upload))
            .route("/classify", web::get().to(get_classification))
            .route("/classify/data-url", web::post().to(classify_data_url))
            .route("/codegen", web::get().to(get_codegen))
            .route("/codegen/config", web::patch().to(update_codegen_config))
            .route("/codegen/generate", web::post().to(generate_script))
            .route("/codegen/script", web::get().to(download_script))
            .route("/options", web::get().to(list_options)),
    );
}

pub async fn classify_upload(
    mut payload: Multipart,
    data: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    while let Some(mut field) = payload.try_next().await? {
        let filename = match field.content_disposition().get_filename() {
            Some(name) => name.to_string(),
            None => continue,
        };

        let content_type = field
            .content_type()
            .map(|ct| ct.to_string())
            .unwrap_or_default();

        let mut file_data = Vec::new();
        while let Some(chunk) = field
            .try_next()
            .await
            .map_err(|e| VisionLabError::Io(format!("Failed to read upload: {}", e)))?
        {
            if file_data.len() + chunk.len() > data.max_upload_bytes {
                return Err(VisionLabError::Io(format!(
                    "Upload exceeds {} bytes",
                    data.max_upload_bytes
                ))
                .into());
            }
            file_data.extend_from_slice(&chunk);
        }

        let mut upload = UploadedFile {
            filename,
            content_type,
            data: file_data,
        };
        let view = data.classification.handle_upload(&mut upload).await;
        return Ok(HttpResponse::Ok().json(view));
    }

    Err(VisionLabError::Validation("No file provided".to_string()).into())
}

pub async fn classify_data_url(
    body: web::Json<DataUrlUpload>,
    data: web::Data<AppState>,
) -> HttpResponse {
    let view = data.classification.handle_data_url(&body.data_url).await;
    HttpResponse::Ok().json(view)
}

pub async fn get_classification(data: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(data.classification.view())
}

pub async fn get_codegen(data: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(data.codegen.view())
}

pub async fn update_codegen_config(
    body: web::Json<CodeGenConfigPatch>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, VisionLabError> {
    let view = data.codegen.update_config(body.into_inner())?;
    Ok(HttpResponse::Ok().json(view))
}

pub async fn generate_script(data: web::Data<AppState>) -> HttpResponse {
    match data.codegen.generate().await {
        GenerateOutcome::Finished(view) => HttpResponse::Ok().json(view),
        GenerateOutcome::Busy(view) => HttpResponse::Conflict().json(view),
    }
}

pub async fn download_script(data: web::Data<AppState>) -> HttpResponse {
    match data.codegen.script() {
        Some(script) => HttpResponse::Ok()
            .content_type("text/x-python; charset=utf-8")
            .insert_header((
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"train_model.py\"",
            ))
            .body(script.0),
        None => HttpResponse::NotFound().json(serde_json::json!({
            "error": "Not found",
            "message": "No script has been generated yet"
        })),
    }
}

pub async fn list_options() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "frameworks": Framework::ALL.iter().map(Framework::as_str).collect::<Vec<_>>(),
        "baseModels": BASE_MODELS
    }))
}
