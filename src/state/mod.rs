use std::sync::Arc;

use crate::core::config::{AppPaths, ConfigService};
use crate::rag::RagService;

pub mod error;

use error::InitializationError;

/// Application state shared across all routes.
#[derive(Clone)]
pub struct AppState {
    pub paths: Arc<AppPaths>,
    pub config: ConfigService,
    pub rag: RagService,
}

impl AppState {
    /// Resolves paths, reads the config and builds the RAG service.
    ///
    /// Collections are not loaded here; call `rag.initialize()` to warm up.
    pub fn initialize() -> Result<Arc<Self>, InitializationError> {
        let paths = Arc::new(AppPaths::new());
        Self::with_paths(paths)
    }

    pub fn with_paths(paths: Arc<AppPaths>) -> Result<Arc<Self>, InitializationError> {
        let config = ConfigService::new(paths.clone());
        let settings = config
            .rag_settings()
            .map_err(InitializationError::Config)?;
        let rag = RagService::from_settings(settings).map_err(InitializationError::Rag)?;

        Ok(Arc::new(AppState { paths, config, rag }))
    }

    pub fn with_rag(paths: Arc<AppPaths>, rag: RagService) -> Arc<Self> {
        let config = ConfigService::new(paths.clone());
        Arc::new(AppState { paths, config, rag })
    }
}
