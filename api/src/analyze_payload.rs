use serde::Deserialize;

#[derive(Deserialize)]
pub struct AnalyzePayload {
    pub query: String,
    pub filename: String,
}
