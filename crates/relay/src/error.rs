use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("Rate limit exceeded, please try again later")]
    RateLimited,

    #[error("Service unavailable, please try again later")]
    PaymentRequired,

    #[error("Upstream returned status {status}")]
    Upstream { status: u16, body: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RelayError {
    /// HTTP status the relay answers with
    pub fn status_code(&self) -> u16 {
        match self {
            RelayError::InvalidRequest(_) => 400,
            RelayError::RateLimited => 429,
            RelayError::PaymentRequired => 402,
            RelayError::Upstream { .. }
            | RelayError::Http(_)
            | RelayError::NotConfigured(_)
            | RelayError::Io(_) => 500,
        }
    }

    /// Whether the message is safe to show to the caller as-is
    pub fn is_public(&self) -> bool {
        matches!(
            self,
            RelayError::InvalidRequest(_) | RelayError::RateLimited | RelayError::PaymentRequired
        )
    }
}
