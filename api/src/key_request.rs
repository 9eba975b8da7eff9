use serde::Deserialize;

#[derive(Deserialize)]
pub struct KeyRequest {
    pub key: String,
}
