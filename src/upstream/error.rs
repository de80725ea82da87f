use thiserror::Error;

/// Failure of a single upstream completion call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UpstreamError {
    #[error("DeepSeek API key not configured")]
    MissingCredential,

    #[error("DeepSeek API error: {status} - {body}")]
    Status { status: u16, body: String },

    #[error("Invalid response format from DeepSeek")]
    InvalidFormat,

    /// Connection, TLS, or body-read failure; carries the transport's own message
    #[error("{0}")]
    Transport(String),
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}
