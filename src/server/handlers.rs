//! HTTP handlers

use super::AppState;
use crate::domain::model::{CatalogItem, CatalogLookupRequest};
use crate::utils::error::{RelayError, Result};
use axum::{
    extract::{multipart::MultipartError, rejection::JsonRejection, Multipart, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

const UPLOAD_FIELD: &str = "file";

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

fn multipart_error(e: MultipartError) -> RelayError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        RelayError::UploadTooLarge(e.body_text())
    } else {
        RelayError::invalid_request(UPLOAD_FIELD, e.body_text())
    }
}

/// `POST /upload-medicine-photo/`
pub async fn upload_medicine_photo(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<CatalogItem>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(multipart_error)?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or("upload").to_string();
        let data = field
            .bytes()
            .await
            .map_err(multipart_error)?;

        tracing::info!("Received upload {} ({} bytes)", file_name, data.len());
        let item = state.pipeline.identify_upload(&file_name, &data).await?;
        return Ok(Json(item));
    }

    Err(RelayError::invalid_request(
        UPLOAD_FIELD,
        "multipart form has no file field",
    ))
}

/// `POST /get_item_info`
pub async fn get_item_info(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CatalogLookupRequest>, JsonRejection>,
) -> Result<Json<CatalogItem>> {
    let Json(request) =
        payload.map_err(|rejection| RelayError::invalid_request("body", rejection.body_text()))?;
    tracing::info!("Item lookup for {:?}", request.item_name);
    let item = state.pipeline.lookup(&request).await?;
    Ok(Json(item))
}
