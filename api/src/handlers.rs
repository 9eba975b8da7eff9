use axum::{
    extract::{
        multipart::{Field, MultipartRejection},
        rejection::JsonRejection,
        Multipart, State,
    },
    Json,
};
use std::io;
use threat_analyst::{has_pdf_extension, validate_filename};

use crate::analyze_payload::AnalyzePayload;
use crate::error::ApiError;
use crate::key_request::KeyRequest;
use crate::responses::*;
use crate::state::AppState;

const NO_FILE_UPLOADED: &str = "No file uploaded";
const INVALID_FILENAME: &str = "Invalid filename";

/// POST /api/key
pub async fn update_api_key(
    State(state): State<AppState>,
    payload: Result<Json<KeyRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(payload) = payload?;
    require_non_empty("key", &payload.key)?;

    log::info!("Updating OpenAI API key to {}", mask_key(&payload.key));
    state.replace_api_key(payload.key).await;

    Ok(Json(MessageResponse {
        message: "API key updated successfully".to_string(),
    }))
}

/// POST /api/upload
pub async fn upload_file(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut multipart = multipart.map_err(|err| {
        log::warn!("Rejected upload without a multipart body: {}", err);
        ApiError::bad_request(NO_FILE_UPLOADED)
    })?;

    while let Some(field) = multipart.next_field().await.map_err(|err| {
        log::warn!("Malformed multipart body: {}", err);
        ApiError::bad_request(NO_FILE_UPLOADED)
    })? {
        if field.name() != Some("file") {
            continue;
        }
        // An empty filename means the part is a plain form value, not a file.
        let Some(filename) = field.file_name().filter(|name| !name.is_empty()).map(str::to_string) else {
            continue;
        };
        return store_upload(&state, filename, field).await;
    }

    Err(ApiError::bad_request(NO_FILE_UPLOADED))
}

async fn store_upload(
    state: &AppState,
    filename: String,
    mut field: Field<'_>,
) -> Result<Json<UploadResponse>, ApiError> {
    if !has_pdf_extension(&filename) {
        return Err(ApiError::bad_request("File must be a PDF"));
    }
    validate_filename(&filename).map_err(|err| {
        log::warn!("Rejected upload: {}", err);
        ApiError::bad_request(INVALID_FILENAME)
    })?;

    state.store.ensure_dir().await.map_err(|err| {
        log::error!("Failed to create upload directory {}: {}", state.store.dir().display(), err);
        ApiError::internal("Failed to create upload directory")
    })?;

    let mut staged = state.store.stage(&filename).await.map_err(save_failed)?;
    let mut size = 0usize;
    loop {
        match field.chunk().await {
            Ok(Some(chunk)) => {
                size += chunk.len();
                if let Err(err) = staged.write(&chunk).await {
                    staged.discard().await;
                    return Err(save_failed(err));
                }
            }
            Ok(None) => break,
            Err(err) => {
                log::warn!("Upload of {} interrupted: {}", filename, err);
                staged.discard().await;
                return Err(ApiError::bad_request(NO_FILE_UPLOADED));
            }
        }
    }
    let path = staged.commit().await.map_err(save_failed)?;

    log::info!("Stored {} ({} bytes) at {}", filename, size, path.display());
    Ok(Json(UploadResponse {
        message: "File uploaded successfully".to_string(),
        filename,
    }))
}

fn save_failed(err: io::Error) -> ApiError {
    log::error!("Failed to save upload: {}", err);
    ApiError::internal("Failed to save file")
}

/// POST /api/analyze
pub async fn analyze_query(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzePayload>, JsonRejection>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let Json(payload) = payload?;
    require_non_empty("query", &payload.query)?;
    require_non_empty("filename", &payload.filename)?;

    validate_filename(&payload.filename).map_err(|err| {
        log::warn!("Rejected analyze request: {}", err);
        ApiError::bad_request(INVALID_FILENAME)
    })?;

    if !state.store.exists(&payload.filename).await {
        return Err(ApiError::not_found("File not found"));
    }

    let openai = state.openai_client().await;
    log::info!("Analyzing {} for query: {}", payload.filename, payload.query);

    let response = openai
        .analyze(&payload.filename, &payload.query)
        .await
        .map_err(|err| {
            log::error!("Analysis of {} failed: {:#}", payload.filename, err);
            ApiError::internal(format!("{:#}", err))
        })?;

    Ok(Json(AnalyzeResponse { response }))
}

/// GET /api/files
pub async fn list_files(State(state): State<AppState>) -> Result<Json<FilesResponse>, ApiError> {
    let files = state.store.list().await.map_err(|err| {
        log::error!("Failed to list uploads: {:#}", err);
        ApiError::internal("Failed to list files")
    })?;
    Ok(Json(FilesResponse { files }))
}

/// GET /api/health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn not_found() -> ApiError {
    ApiError::not_found("Not found")
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

fn require_non_empty(field: &str, value: &str) -> Result<(), ApiError> {
    if value.is_empty() {
        return Err(ApiError::bad_request(format!("Field '{}' is required", field)));
    }
    Ok(())
}

// Keeps only the first and last four characters of a credential for logs.
fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_keys_are_fully_masked() {
        assert_eq!(mask_key("sk-test"), "****");
        assert_eq!(mask_key("sk-1234567890abcd"), "sk-1...abcd");
    }

    #[test]
    fn empty_values_are_rejected() {
        assert!(require_non_empty("key", "sk").is_ok());
        let err = require_non_empty("query", "").unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(msg) if msg.contains("query")));
    }
}
