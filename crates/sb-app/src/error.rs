//! Orchestration-level errors.
//!
//! The document store and history engine never fail; everything
//! failure-prone (AI calls, uploads) happens at this boundary and is
//! translated into these user-presentable errors.

use crate::ai::UploadError;
use thiserror::Error;

/// An error reported by one of the AI collaborators. The services are
/// external; their failures arrive as messages, not as structured causes.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AiError {
    message: String,
}

impl AiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// User-visible failures of controller operations.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// A second AI request was issued while one is in flight. The first
    /// request keeps running; this one is refused.
    #[error("an AI request is already in progress")]
    Busy,

    #[error("flow generation failed: {0}")]
    Generation(AiError),

    #[error("summarization failed: {0}")]
    Summarization(AiError),

    #[error("sketch processing failed: {0}")]
    SketchProcessing(AiError),

    #[error("invalid sketch upload: {0}")]
    InvalidUpload(#[from] UploadError),

    /// Summarize was requested with nothing selected.
    #[error("nothing is selected")]
    EmptySelection,
}
