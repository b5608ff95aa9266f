use thiserror::Error;

/// Failure modes of a backend call
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Transport failure (connection refused, fetch aborted, ...)
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success HTTP status with a body that is not an envelope
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Body is not JSON, lacks `success`, or `data` has the wrong shape
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// Backend answered `success: false`
    #[error("{message}")]
    Rejected { message: String },

    /// The request itself could not be built
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    /// Create an error from a reqwest error
    pub fn from_reqwest(error: reqwest::Error) -> Self {
        if error.is_builder() {
            ApiError::InvalidRequest(error.to_string())
        } else if error.is_decode() {
            ApiError::Malformed(error.to_string())
        } else {
            ApiError::Network(error.to_string())
        }
    }

    /// Message the backend attached to a rejection, if any
    pub fn rejection_message(&self) -> Option<&str> {
        match self {
            ApiError::Rejected { message } => Some(message),
            _ => None,
        }
    }

    /// Whether the server responded at all (as opposed to a transport fault)
    pub fn is_response_error(&self) -> bool {
        matches!(
            self,
            ApiError::Status { .. } | ApiError::Malformed(_) | ApiError::Rejected { .. }
        )
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::from_reqwest(err)
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
