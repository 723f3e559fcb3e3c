use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
};

use crate::api::response;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    InvalidInput(String),

    /// Target site answered with a non-2xx status, or the request never got a
    /// response at all (`status` is `None`).
    #[error("Failed to fetch URL: {message}")]
    FetchFailed {
        status: Option<u16>,
        message: String,
    },

    #[error("Request timeout")]
    Timeout,

    #[error("No readable content found")]
    NoContent,

    #[error("{0}")]
    SummarizationFailed(String),

    #[error("Unclassified failure: {0}")]
    Unclassified(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    pub fn http_status(status: u16) -> Self {
        AppError::FetchFailed {
            status: Some(status),
            message: status.to_string(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) | AppError::FetchFailed { .. } | AppError::NoContent => {
                StatusCode::BAD_REQUEST
            }
            AppError::Timeout => StatusCode::REQUEST_TIMEOUT,
            AppError::SummarizationFailed(_)
            | AppError::Unclassified(_)
            | AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the caller. Unclassified details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Unclassified(_) | AppError::Config(_) => "Scraping failed".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Unclassified(detail) | AppError::Config(detail) = &self {
            tracing::error!(%detail, "Unclassified failure while summarizing");
        }

        response::error(self.status_code(), self.public_message()).into_response()
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::FetchFailed {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
