use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// How the push API turned a request down, classified by its status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    BadRequest,
    Unauthorized,
    Forbidden,
    Other,
}

impl Rejection {
    pub fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::BAD_REQUEST => Self::BadRequest,
            StatusCode::UNAUTHORIZED => Self::Unauthorized,
            StatusCode::FORBIDDEN => Self::Forbidden,
            _ => Self::Other,
        }
    }

    pub fn user_message(self) -> &'static str {
        match self {
            Self::BadRequest => "invalid request: check the message format or user id",
            Self::Unauthorized => "invalid channel access token",
            Self::Forbidden => "forbidden: check the bot permissions",
            Self::Other => "failed to send message",
        }
    }
}

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("credential not configured")]
    MissingCredential,

    #[error("message is required and must be a non-empty string")]
    InvalidMessage,

    #[error("request body must be a JSON object")]
    MalformedBody,

    #[error("unauthorized")]
    Unauthenticated,

    #[error("push API rejected the message with {status}")]
    Rejected { status: StatusCode, kind: Rejection },

    #[error("transport fault: {0}")]
    Transport(#[from] anyhow::Error),
}

impl RelayError {
    pub fn rejected(status: StatusCode) -> Self {
        Self::Rejected {
            status,
            kind: Rejection::from_status(status),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingCredential | Self::Transport(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::InvalidMessage | Self::MalformedBody => StatusCode::BAD_REQUEST,
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Rejected { status, .. } => *status,
        }
    }

    /// Text returned to the caller. Transport detail stays in the logs.
    pub fn user_message(&self) -> String {
        match self {
            Self::Rejected { kind, .. } => kind.user_message().to_string(),
            Self::Transport(_) => "internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for RelayError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.into())
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.user_message() }))).into_response()
    }
}
