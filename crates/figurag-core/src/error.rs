use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Malformed catalog: {0}")]
    MalformedCatalog(String),

    #[error("Failed to ingest {}: {reason}", path.display())]
    Ingest { path: PathBuf, reason: String },

    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Provider timed out after {0}s")]
    ProviderTimeout(u64),

    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for failures of a remote capability, which callers recover from
    /// by falling back to the deterministic path.
    pub fn is_provider_failure(&self) -> bool {
        matches!(
            self,
            Error::ProviderUnavailable(_) | Error::ProviderTimeout(_) | Error::MalformedResponse(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
