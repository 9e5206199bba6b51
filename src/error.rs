//! Error types for chatmark operations.
//!
//! The conversion core (sanitizing and rendering) is total and never returns
//! these; they surface from the page extraction and transport layers.

use thiserror::Error;

/// Errors that can occur while extracting or exporting a conversation.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid selector `{selector}`: {message}")]
    Selector { selector: String, message: String },

    #[error("Missing required element: {0}")]
    MissingElement(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

pub type Result<T> = std::result::Result<T, Error>;
