pub mod config;
pub mod document_store;
pub mod models;
pub mod openai_service;

pub use config::Config;
pub use document_store::{has_pdf_extension, validate_filename, DocumentStore, StagedUpload};
pub use models::*;
pub use openai_service::OpenAiService;
