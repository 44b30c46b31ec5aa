//! Error types for the content and rendering layer

use thiserror::Error;

/// Errors raised while querying content or rendering pages
#[derive(Debug, Error)]
pub enum Error {
    #[error("No post found with slug {slug:?}")]
    NotFound { slug: String },

    #[error("Request to content API failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Content API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Failed to decode content: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid image reference: {0}")]
    InvalidImageRef(String),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error means the requested document does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
