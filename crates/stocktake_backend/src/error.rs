use thiserror::Error;

pub type Result<T> = std::result::Result<T, BackendError>;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("API request failed: {status} {message}")]
    Remote { status: u16, message: String },

    #[error(
        "Unable to connect to inventory server ({0}). Check network connection and API configuration."
    )]
    Unreachable(String),

    #[error("failed to decode backend response: {0}")]
    Decode(String),

    #[error("invalid backend configuration: {0}")]
    Config(String),
}

impl BackendError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, BackendError::NotFound(_))
    }

    pub(crate) fn remote(status: u16, message: impl Into<String>) -> Self {
        BackendError::Remote {
            status,
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            BackendError::Unreachable(err.to_string())
        } else if err.is_decode() {
            BackendError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            BackendError::remote(status.as_u16(), err.to_string())
        } else {
            BackendError::Unreachable(err.to_string())
        }
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(err: serde_json::Error) -> Self {
        BackendError::Decode(err.to_string())
    }
}
