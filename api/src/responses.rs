use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Deserialize, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub filename: String,
}

#[derive(Deserialize, Serialize)]
pub struct AnalyzeResponse {
    pub response: String,
}

#[derive(Deserialize, Serialize)]
pub struct FilesResponse {
    pub files: Vec<String>,
}

#[derive(Deserialize, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}
