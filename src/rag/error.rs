use thiserror::Error;

/// Failures surfaced by the retrieval service.
///
/// Cloneable so a single failed load can be handed to every caller that was
/// waiting on it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RagError {
    #[error("failed to fetch {0}")]
    Network(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("failed to parse {0}")]
    Parse(String),

    #[error("{0}")]
    Unknown(String),
}

impl RagError {
    /// Coarse category for the UI layer: `network`, `parse` or `unknown`.
    pub fn category(&self) -> &'static str {
        match self {
            RagError::Network(_) | RagError::NotFound(_) => "network",
            RagError::Parse(_) => "parse",
            RagError::Unknown(_) => "unknown",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RagError::NotFound(_))
    }

    pub(crate) fn parse(what: &str, err: impl std::fmt::Display) -> Self {
        RagError::Parse(format!("{}: {}", what, err))
    }

    pub(crate) fn network(what: &str, err: impl std::fmt::Display) -> Self {
        RagError::Network(format!("{}: {}", what, err))
    }
}
