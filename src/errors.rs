use axum::http::StatusCode;
use std::fmt;

pub const GENERIC_COMPLETION_ERROR: &str = "Failed to complete task";

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}

/// Why a completion request did not end in a completed task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionError {
    Network(String),
    Status { status: u16, message: Option<String> },
    Decode(String),
    /// The server answered but without the success marker.
    Rejected(Option<String>),
}

impl CompletionError {
    /// Text shown to the user: the server's own message when it sent one.
    pub fn user_message(&self) -> String {
        match self {
            Self::Status {
                message: Some(message),
                ..
            }
            | Self::Rejected(Some(message)) => message.clone(),
            _ => GENERIC_COMPLETION_ERROR.to_string(),
        }
    }
}

impl fmt::Display for CompletionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network(msg) => write!(f, "network error: {msg}"),
            Self::Status { status, message } => match message {
                Some(message) => write!(f, "server returned {status}: {message}"),
                None => write!(f, "server returned {status}"),
            },
            Self::Decode(msg) => write!(f, "invalid response body: {msg}"),
            Self::Rejected(Some(message)) => write!(f, "completion rejected: {message}"),
            Self::Rejected(None) => write!(f, "completion rejected"),
        }
    }
}

impl std::error::Error for CompletionError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartError {
    InvalidData(String),
}

impl fmt::Display for ChartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidData(msg) => write!(f, "cannot draw chart: {msg}"),
        }
    }
}

impl std::error::Error for ChartError {}

/// Failures while wiring a page up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageError {
    MissingElement(&'static str),
    InvalidScoreData(String),
}

impl fmt::Display for PageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingElement(id) => write!(f, "required element missing: {id}"),
            Self::InvalidScoreData(msg) => write!(f, "invalid score data: {msg}"),
        }
    }
}

impl std::error::Error for PageError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_prefers_server_text() {
        let rejected = CompletionError::Rejected(Some("Action already completed".into()));
        assert_eq!(rejected.user_message(), "Action already completed");

        let status = CompletionError::Status {
            status: 400,
            message: Some("Invalid request".into()),
        };
        assert_eq!(status.user_message(), "Invalid request");
    }

    #[test]
    fn user_message_falls_back_to_generic() {
        assert_eq!(
            CompletionError::Network("connection refused".into()).user_message(),
            GENERIC_COMPLETION_ERROR
        );
        assert_eq!(
            CompletionError::Status {
                status: 500,
                message: None
            }
            .user_message(),
            GENERIC_COMPLETION_ERROR
        );
        assert_eq!(CompletionError::Rejected(None).user_message(), GENERIC_COMPLETION_ERROR);
    }
}
