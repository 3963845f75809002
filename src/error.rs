//! Error types shared by the terrain and asset pipelines.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorldError {
    /// A generation parameter is out of range. Raised before any computation.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// Strict registry lookup of a category that does not exist.
    #[error("unknown asset category `{0}`")]
    UnknownCategory(String),

    /// A category definition failed shape validation.
    #[error("invalid profile for category `{category}`: {reason}")]
    InvalidProfile { category: String, reason: String },

    #[error("malformed height map file: {0}")]
    HeightMapFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

impl WorldError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        WorldError::InvalidParameter { name, reason: reason.into() }
    }
}

pub type Result<T> = std::result::Result<T, WorldError>;
