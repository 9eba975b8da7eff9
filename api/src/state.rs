use std::sync::Arc;
use threat_analyst::{Config, DocumentStore, OpenAiService};
use tokio::sync::RwLock;

/// Shared handler state. The chat client sits behind a lock because
/// `/api/key` swaps it while analyze requests may be reading it.
#[derive(Clone)]
pub struct AppState {
    pub openai: Arc<RwLock<OpenAiService>>,
    pub store: Arc<DocumentStore>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let openai = OpenAiService::new(config.openai_api_key.clone(), config.openai_base_url.clone());
        let store = DocumentStore::new(config.upload_dir.clone());

        Self {
            openai: Arc::new(RwLock::new(openai)),
            store: Arc::new(store),
            config: Arc::new(config),
        }
    }

    /// Snapshot of the current client; the lock is released before any
    /// network I/O happens.
    pub async fn openai_client(&self) -> OpenAiService {
        self.openai.read().await.clone()
    }

    pub async fn replace_api_key(&self, key: String) {
        let service = OpenAiService::new(key, self.config.openai_base_url.clone());
        *self.openai.write().await = service;
    }
}
