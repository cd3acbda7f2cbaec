//! Errors surfaced by the AI proxy.

use axum::http::StatusCode;
use thiserror::Error;

/// Longest accepted question, in characters.
pub const MAX_QUESTION_CHARS: usize = 2000;

/// Errors returned by `AiService` and mapped one-to-one onto HTTP statuses.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AiError {
    /// `question` or `context` missing or blank.
    #[error("Missing question/context")]
    MissingQuestion,

    /// `imageUrl` missing or blank.
    #[error("Missing imageUrl")]
    MissingImageUrl,

    /// `mode` was neither `ask` nor `caption`.
    #[error("Invalid mode. Use \"ask\" or \"caption\".")]
    InvalidMode,

    /// Question longer than `MAX_QUESTION_CHARS`.
    #[error("Question too long")]
    QuestionTooLong {
        /// Length that was received.
        chars: usize,
    },

    /// No provider has credentials for this operation.
    #[error("No provider keys configured for {0}")]
    NoProviders(&'static str),

    /// Every configured provider failed.
    #[error("All providers failed.")]
    AllFailed {
        /// Number of providers tried.
        attempts: usize,
        /// The last provider error, for logs.
        last: String,
    },

    /// Every configured provider hit the per-call deadline.
    #[error("Upstream request timed out")]
    TimedOut {
        /// Number of providers tried.
        attempts: usize,
    },
}

impl AiError {
    /// HTTP status for this error.
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingQuestion | Self::MissingImageUrl | Self::InvalidMode => StatusCode::BAD_REQUEST,
            Self::QuestionTooLong { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::NoProviders(_) | Self::AllFailed { .. } => StatusCode::BAD_GATEWAY,
            Self::TimedOut { .. } => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AiError::MissingQuestion.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AiError::InvalidMode.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AiError::QuestionTooLong { chars: 2001 }.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(AiError::NoProviders("ask").status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            AiError::AllFailed { attempts: 2, last: "boom".to_string() }.status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(AiError::TimedOut { attempts: 1 }.status_code(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn test_messages_match_wire_format() {
        assert_eq!(AiError::InvalidMode.to_string(), "Invalid mode. Use \"ask\" or \"caption\".");
        assert_eq!(AiError::MissingImageUrl.to_string(), "Missing imageUrl");
        assert_eq!(AiError::NoProviders("captions").to_string(), "No provider keys configured for captions");
    }
}
