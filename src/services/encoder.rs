// src/services/encoder.rs
use crate::errors::VisionLabError;
use crate::models::ImagePayload;
use base64::{Engine as _, engine::general_purpose};
use log::debug;

/// Anything that can hand over an uploaded file: its declared media type
/// and, once, its full contents.
pub trait ImageSource {
    fn name(&self) -> &str {
        "upload"
    }
    fn media_type(&self) -> &str;
    fn read_all(&mut self) -> std::io::Result<Vec<u8>>;
}

/// A file collected from a multipart upload.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl ImageSource for UploadedFile {
    fn name(&self) -> &str {
        &self.filename
    }

    fn media_type(&self) -> &str {
        &self.content_type
    }

    fn read_all(&mut self) -> std::io::Result<Vec<u8>> {
        Ok(std::mem::take(&mut self.data))
    }
}

#[derive(Debug, Default)]
pub struct ImageEncoder;

impl ImageEncoder {
    pub fn new() -> Self {
        Self
    }

    pub fn encode<S: ImageSource>(&self, source: &mut S) -> Result<ImagePayload, VisionLabError> {
        let media_type = source.media_type().trim().to_string();
        ensure_image_media_type(&media_type)?;

        let bytes = source.read_all()?;
        debug!("Encoding {} ({}, {} bytes)", source.name(), media_type, bytes.len());
        let encoded = general_purpose::STANDARD.encode(bytes);

        Ok(ImagePayload {
            encoded_data: encoded,
            media_type,
        })
    }

    /// Accepts what a browser `FileReader.readAsDataURL` produces.
    pub fn from_data_url(&self, data_url: &str) -> Result<ImagePayload, VisionLabError> {
        let (header, _) = data_url.trim().split_once(',').ok_or_else(|| {
            VisionLabError::InvalidInputKind("Data URL has no payload".to_string())
        })?;

        let header = header.strip_prefix("data:").ok_or_else(|| {
            VisionLabError::InvalidInputKind("Not a data URL".to_string())
        })?;

        let mut params = header.split(';');
        let media_type = params.next().unwrap_or_default().trim().to_string();
        ensure_image_media_type(&media_type)?;

        if !params.any(|p| p.trim().eq_ignore_ascii_case("base64")) {
            return Err(VisionLabError::InvalidInputKind(
                "Data URL is not base64 encoded".to_string(),
            ));
        }

        let encoded_data = strip_scheme_prefix(data_url.trim()).to_string();
        general_purpose::STANDARD
            .decode(&encoded_data)
            .map_err(|e| VisionLabError::InvalidInputKind(format!("Invalid base64 payload: {}", e)))?;

        Ok(ImagePayload {
            encoded_data,
            media_type,
        })
    }
}

fn ensure_image_media_type(media_type: &str) -> Result<(), VisionLabError> {
    if media_type.starts_with("image/") {
        Ok(())
    } else {
        Err(VisionLabError::InvalidInputKind(format!(
            "Not an image: {}",
            if media_type.is_empty() { "<none>" } else { media_type }
        )))
    }
}

/// Drops a leading `data:<type>;base64,` header if there is one.
pub fn strip_scheme_prefix(text: &str) -> &str {
    if text.starts_with("data:") {
        if let Some((_, payload)) = text.split_once(',') {
            return payload;
        }
    }
    text
}
