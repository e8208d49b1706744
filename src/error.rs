use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeckError {
    /// Request never completed (DNS, connect, timeout, broken pipe).
    #[error("Network error: {0}")]
    Network(String),

    /// Server answered with a non-2xx status. `message` is the server's
    /// error-body message when one could be parsed, or a generic fallback.
    #[error("{message} (HTTP {status})")]
    Http { status: u16, message: String },

    /// Client-side validation failure, detected before any request is sent.
    #[error("{0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid response body: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for DeckError {
    fn from(e: reqwest::Error) -> Self {
        // Status errors are mapped to Http at the call site where the body
        // is available; anything arriving here never got a usable response.
        DeckError::Network(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DeckError>;
