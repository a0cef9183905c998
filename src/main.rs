// src/main.rs
use actix_web::{App, HttpResponse, HttpServer, middleware, web};
use log::{info, warn};
use std::sync::Arc;

mod config;
mod errors;
mod flows;
mod handlers;
mod models;
mod services;
#[cfg(test)]
mod testing;

use crate::config::Config;
use crate::flows::{ClassificationFlow, CodeGenFlow};
use crate::services::{GeminiBackend, Gateway};

#[derive(Clone)]
pub struct AppState {
    classification: Arc<ClassificationFlow>,
    codegen: Arc<CodeGenFlow>,
    max_upload_bytes: usize,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    info!("Starting Vision Lab service...");

    let config = Config::from_env()?;
    if config.gateway.api_key.is_none() {
        warn!("No GEMINI_API_KEY or API_KEY set; every model call will fail");
    }

    // Initialize services
    let backend = Arc::new(GeminiBackend::new(&config.gateway)?);
    let gateway = Arc::new(Gateway::new(config.gateway.clone(), backend));

    let app_state = AppState {
        classification: Arc::new(ClassificationFlow::new(gateway.clone())),
        codegen: Arc::new(CodeGenFlow::new(gateway)),
        max_upload_bytes: config.max_upload_bytes,
    };

    // Data URLs carry the image base64 encoded plus a short header.
    let json_limit = config.max_upload_bytes / 3 * 4 + 1024;

    info!("Starting HTTP server on {}", config.bind);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().limit(json_limit))
            .wrap(middleware::Logger::default())
            .configure(handlers::routes)
            .route("/health", web::get().to(health_check))
    })
    .bind(&config.bind)?
    .run()
    .await?;

    Ok(())
}

async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "vision-lab",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
