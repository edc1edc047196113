use std::time::Duration;

use http::StatusCode;
use thiserror::Error;

/// Fallback notice when the endpoint gives no usable error message.
pub const GENERIC_FAILURE: &str = "Failed to get response";

/// Failures that end a whole exchange. These are the only errors the
/// user ever sees.
#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("Failed to reach the study assistant: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{message}")]
    Response { status: StatusCode, message: String },

    #[error("No response body")]
    EmptyBody,

    #[error("The study assistant stopped responding after {0:?}")]
    Stalled(Duration),
}

/// A send refused before any request was made.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SendError {
    #[error("A reply is still streaming for this session")]
    Busy,

    #[error("Message is empty")]
    EmptyMessage,
}

/// A single frame that could not be decoded. Never leaves the consumer.
#[derive(Debug, Error)]
#[error("Malformed stream frame: {0}")]
pub struct FrameParseError(#[from] serde_json::Error);
