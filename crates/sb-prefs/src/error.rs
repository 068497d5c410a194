//! Error taxonomy for the persistence layer.
//!
//! These errors stay internal to the crate: the adapter facade converts
//! every failure into a boolean or an absent value before it reaches the
//! caller, so persistence can never take the canvas down.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PrefsError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Remote answered with a non-2xx status (other than the 404
    /// "no preference yet" case, which is a valid empty result).
    #[error("remote preference store returned status {status}")]
    Http { status: u16 },

    /// Network-level failure before any status was received.
    #[error("transport error: {0}")]
    Transport(String),

    /// Every retry attempt failed.
    #[error("all {attempts} attempts failed, last error: {last}")]
    Exhausted { attempts: u32, last: String },
}

pub type Result<T> = std::result::Result<T, PrefsError>;
