use thiserror::Error;

/// Message shown when the endpoint answers with neither `prediction` nor `error`.
pub const UNEXPECTED_RESPONSE: &str = "Unexpected server response";

/// Why a prediction request did not produce a label.
///
/// `Display` is the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PredictError {
    /// Connection, TLS or request-building failure.
    #[error("{0}")]
    Transport(String),
    /// The body was not JSON.
    #[error("{0}")]
    InvalidJson(String),
    /// The endpoint reported an error in its `error` field.
    #[error("{0}")]
    Server(String),
    #[error("{}", UNEXPECTED_RESPONSE)]
    UnexpectedResponse,
}

impl From<reqwest::Error> for PredictError {
    fn from(err: reqwest::Error) -> Self {
        PredictError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for PredictError {
    fn from(err: serde_json::Error) -> Self {
        PredictError::InvalidJson(err.to_string())
    }
}
