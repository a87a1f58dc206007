use thiserror::Error;

/// Failures surfaced by repositories and use cases.
///
/// `Api` and `InvalidPayload` are the "the server said no" class that flows
/// such as sign-in react to; `Transport` covers everything that never got a
/// meaningful answer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClientError {
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Storage error: {0}")]
    Storage(String),
}

impl ClientError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        ClientError::Api {
            status,
            message: message.into(),
        }
    }

    /// True when the request reached a decision point (server rejection or
    /// an unusable payload) rather than failing in transit.
    pub fn is_api_failure(&self) -> bool {
        matches!(self, ClientError::Api { .. } | ClientError::InvalidPayload(_))
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => ClientError::api(status.as_u16(), err.to_string()),
            None if err.is_decode() => ClientError::InvalidPayload(err.to_string()),
            None => ClientError::Transport(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::InvalidPayload(err.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::Storage(err.to_string())
    }
}

impl From<toml::de::Error> for ClientError {
    fn from(err: toml::de::Error) -> Self {
        ClientError::Config(err.to_string())
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
