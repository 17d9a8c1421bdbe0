//! Application state.

use std::sync::Arc;

use intens_media::{GifTool, Gifsicle};
use intens_storage::LocalStore;

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub store: Arc<LocalStore>,
    pub backend: Arc<dyn GifTool>,
}

impl AppState {
    /// Create new application state.
    ///
    /// Fails fast when the storage directories cannot be created or the
    /// gifsicle binary cannot be found, so a misconfigured deployment
    /// dies at startup instead of on the first upload.
    pub async fn new(config: ApiConfig) -> anyhow::Result<Self> {
        let store = LocalStore::open(&config.upload_dir, &config.output_dir).await?;

        let backend = match &config.gifsicle_path {
            Some(path) => Gifsicle::with_binary(path),
            None => Gifsicle::new()?,
        }
        .with_timeout(config.tool_timeout.as_secs());

        Ok(Self {
            config,
            store: Arc::new(store),
            backend: Arc::new(backend),
        })
    }
}
