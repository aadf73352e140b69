// error.rs - Error type shared by the client, the controller and the CLI
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

/// Message shown when the backend rejects a request without saying why.
pub const FALLBACK_ERROR_MESSAGE: &str = "Server error";

#[derive(Error, Debug)]
pub enum StudioError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{message}")]
    Backend { status: u16, message: String },

    #[error("Invalid response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Response is missing `{0}`")]
    MissingField(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0} is not an image")]
    NotAnImage(String),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("No image available to generate visuals")]
    NoImage,

    #[error("No visuals available")]
    NoVisuals,

    #[error("Backend did not become healthy within {0:?}")]
    Unhealthy(Duration),
}

impl StudioError {
    /// True for the two workflow gates, which never reach the network.
    pub fn is_blocked(&self) -> bool {
        matches!(self, StudioError::NoImage | StudioError::NoVisuals)
    }
}

/// Pull a human-readable error out of a backend JSON body.
///
/// Objects prefer `detail` over `error`. Some backend handlers answer with a
/// `[ {"error": ...}, 400 ]` pair instead of a real status code; the first
/// element is inspected in that case.
pub fn backend_error_message(body: &Value) -> Option<String> {
    match body {
        Value::Object(map) => ["detail", "error"]
            .iter()
            .filter_map(|key| map.get(*key))
            .find_map(message_text),
        Value::Array(items) => items.first().and_then(backend_error_message),
        _ => None,
    }
}

/// Status code carried by the `[body, code]` pair shape, if any.
pub fn embedded_status(body: &Value) -> Option<u16> {
    match body {
        Value::Array(items) if items.len() == 2 => items[1]
            .as_u64()
            .and_then(|code| u16::try_from(code).ok()),
        _ => None,
    }
}

fn message_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        // FastAPI validation errors put a list of objects under `detail`
        other => Some(other.to_string()),
    }
}
