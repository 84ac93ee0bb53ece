//! Request body for entity create/update routes.
//!
//! Accepts either a plain JSON body, or `multipart/form-data` with a
//! `payload` part holding the JSON and an optional `file` part.

use axum::{
    async_trait,
    extract::{FromRequest, Multipart, Request},
    http::header,
    Json,
};
use serde::de::DeserializeOwned;

use crate::app::AppState;
use crate::error::ApiError;
use crate::services::Upload;

pub const PAYLOAD_PART: &str = "payload";
pub const FILE_PART: &str = "file";

#[derive(Debug)]
pub struct EntityPayload<T> {
    pub body: T,
    pub file: Option<Upload>,
}

fn is_multipart(req: &Request) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.starts_with("multipart/form-data"))
        .unwrap_or(false)
}

#[async_trait]
impl<T> FromRequest<AppState> for EntityPayload<T>
where
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        if !is_multipart(&req) {
            let Json(body) = Json::<T>::from_request(req, state)
                .await
                .map_err(|rejection| ApiError::Validation(rejection.body_text()))?;
            return Ok(Self { body, file: None });
        }

        let max_upload = state.config.limits.max_upload_bytes;
        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::Validation(rejection.body_text()))?;

        let mut payload: Option<String> = None;
        let mut file: Option<Upload> = None;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::Validation(e.body_text()))?
        {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                PAYLOAD_PART => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| ApiError::Validation(e.body_text()))?;
                    payload = Some(text);
                }
                FILE_PART => {
                    let file_name = field.file_name().unwrap_or("upload").to_string();
                    let content_type = field.content_type().map(str::to_string);
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| ApiError::Validation(e.body_text()))?;

                    if bytes.len() > max_upload {
                        return Err(ApiError::PayloadTooLarge(format!(
                            "File exceeds the {} byte limit",
                            max_upload
                        )));
                    }
                    // Browsers send an empty part when no file was picked.
                    if !bytes.is_empty() {
                        file = Some(Upload::new(&file_name, content_type.as_deref(), bytes.to_vec()));
                    }
                }
                other => {
                    tracing::debug!(part = other, "Ignoring unknown multipart part");
                }
            }
        }

        let payload = payload.unwrap_or_else(|| "{}".to_string());
        let body = serde_json::from_str(&payload).map_err(|e| {
            ApiError::Validation(format!("Invalid '{}' part: {}", PAYLOAD_PART, e))
        })?;

        Ok(Self { body, file })
    }
}
