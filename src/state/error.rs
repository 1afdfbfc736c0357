use thiserror::Error;

use crate::core::errors::ApiError;
use crate::rag::RagError;

#[derive(Debug, Error)]
pub enum InitializationError {
    #[error("Failed to load configuration: {0}")]
    Config(#[source] ApiError),

    #[error("Failed to set up RAG service: {0}")]
    Rag(#[source] RagError),
}
