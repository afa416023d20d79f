//! Error types for the async job client.

use std::time::Duration;

fn http_or_transport(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!("HTTP {code}"),
        None => "transport error".to_string(),
    }
}

/// Errors that can occur while running a generation job.
#[derive(Debug, thiserror::Error)]
pub enum VidJobError {
    /// API key missing or invalid.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The job-creation call failed (non-200 response or transport failure).
    #[error("submission failed ({}): {body}", http_or_transport(.status))]
    Submission {
        /// HTTP status of the creation response, absent on transport failure.
        status: Option<u16>,
        /// Raw response body, or the transport error text.
        body: String,
    },

    /// The deadline expired before the job reached a terminal state.
    #[error("polling timed out after {0:?}")]
    PollTimeout(Duration),

    /// The service reported the job as failed.
    #[error("remote job failed: {0}")]
    JobFailed(String),

    /// The content fetch failed, or the stream broke mid-transfer.
    #[error("download failed ({}): {message}", http_or_transport(.status))]
    Download {
        /// HTTP status of the content response, absent on transport failure.
        status: Option<u16>,
        /// Raw response body, or the transport error text.
        message: String,
    },

    /// Invalid request parameters.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Other network or HTTP-layer error (e.g., decoding a response body).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// I/O error (e.g., writing the artifact).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl VidJobError {
    /// Returns true if this error is likely transient and worth retrying
    /// as a whole new pipeline run.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::PollTimeout(_) | Self::Network(_))
    }
}

/// Result type alias for job client operations.
pub type Result<T> = std::result::Result<T, VidJobError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_retryable() {
        assert!(VidJobError::PollTimeout(Duration::from_secs(600)).is_retryable());

        assert!(!VidJobError::Auth("bad key".into()).is_retryable());
        assert!(!VidJobError::JobFailed("moderation".into()).is_retryable());
        assert!(!VidJobError::Submission {
            status: Some(400),
            body: "bad prompt".into()
        }
        .is_retryable());
        assert!(!VidJobError::Download {
            status: Some(404),
            message: "gone".into()
        }
        .is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = VidJobError::Submission {
            status: Some(429),
            body: "rate limited".into(),
        };
        assert_eq!(err.to_string(), "submission failed (HTTP 429): rate limited");

        let err = VidJobError::Submission {
            status: None,
            body: "connection refused".into(),
        };
        assert_eq!(
            err.to_string(),
            "submission failed (transport error): connection refused"
        );

        let err = VidJobError::JobFailed("content policy violation".into());
        assert_eq!(err.to_string(), "remote job failed: content policy violation");

        let err = VidJobError::Download {
            status: Some(404),
            message: "not found".into(),
        };
        assert_eq!(err.to_string(), "download failed (HTTP 404): not found");
    }
}
