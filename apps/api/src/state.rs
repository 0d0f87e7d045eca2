use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::ModelGateway;
use crate::screening::batch::BatchOptions;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// `None` when no API key is configured; processing requests are then
    /// rejected before any file is touched.
    pub gateway: Option<Arc<dyn ModelGateway>>,
    pub config: Config,
}

impl AppState {
    pub fn batch_options(&self) -> BatchOptions {
        BatchOptions {
            max_concurrency: self.config.max_concurrent_files,
            call_timeout: self.config.llm_timeout,
        }
    }
}
