//! Error types for the coaching core

use thiserror::Error;

/// Failure of a single call into the vision-language model.
///
/// The core never retries; the caller decides whether to re-trigger the event.
#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("Model request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Model server returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed model response: {0}")]
    Malformed(String),

    #[error("Model unavailable: {0}")]
    Unavailable(String),
}

/// Errors from the image provider
#[derive(Error, Debug)]
pub enum ImageError {
    #[error("Could not read image: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image is empty")]
    Empty,

    #[error("Unsupported image format (expected PNG or JPEG)")]
    UnsupportedFormat,
}

/// Errors surfaced at the event boundary
#[derive(Error, Debug)]
pub enum CoachError {
    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error(transparent)]
    Image(#[from] ImageError),

    #[error("{field} must not be empty")]
    InvalidInput { field: &'static str },

    #[error("Session not initialized. Upload an image and run an assessment first.")]
    NotInitialized,

    #[error("No code image uploaded")]
    MissingImage,
}
