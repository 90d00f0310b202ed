use std::path::PathBuf;
use thiserror::Error;

/// Every failure is fatal; the run stops at the first one and nothing is saved.
#[derive(Debug, Error)]
pub enum EmbedError {
    #[error("cannot open {}: {source}", path.display())]
    FileOpen {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("cannot decode {what}: {source}")]
    Decode {
        what: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("cannot build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error("{0} not found")]
    NotFound(String),

    #[error("cannot save {}: {source}", path.display())]
    FileWrite {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl EmbedError {
    pub fn file_open(
        path: impl Into<PathBuf>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        EmbedError::FileOpen {
            path: path.into(),
            source: source.into(),
        }
    }

    pub fn file_write(
        path: impl Into<PathBuf>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        EmbedError::FileWrite {
            path: path.into(),
            source: source.into(),
        }
    }

    pub fn decode(
        what: &'static str,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        EmbedError::Decode {
            what,
            source: source.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EmbedError>;
