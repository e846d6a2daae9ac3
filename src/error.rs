//! Client error taxonomy
//!
//! Every failure of a dispatched request ends up here. The controller maps
//! all of them to one generic notice; the detail only goes to the log.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Connection refused, reset, DNS failure...
    #[error("transport error: {0}")]
    Transport(String),

    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// Non-2xx status, regardless of body
    #[error("backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// 2xx with an `error` field in the JSON envelope
    #[error("backend error: {0}")]
    Application(String),

    #[error("could not decode response: {0}")]
    Decode(String),

    /// Aborted by the user while in flight
    #[error("request cancelled")]
    Cancelled,
}

impl ClientError {
    pub fn from_reqwest(err: reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            ClientError::Timeout(timeout_secs)
        } else if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Transport(err.to_string())
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ClientError::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_message_includes_code() {
        let err = ClientError::Status {
            status: 500,
            body: "boom".into(),
        };
        assert_eq!(err.to_string(), "backend returned HTTP 500: boom");
    }

    #[test]
    fn test_only_cancel_is_cancelled() {
        assert!(ClientError::Cancelled.is_cancelled());
        assert!(!ClientError::Timeout(5).is_cancelled());
    }
}
