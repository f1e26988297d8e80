//! JSON error responses

use crate::utils::error::TubefetchError;
use crate::validator::ValidationError;
use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::{error, warn};

pub const MSG_INVALID_ACTION: &str = "Invalid action";
pub const MSG_RETRIEVE_FAILED: &str =
    "Could not retrieve video information. The video may be private, deleted, or copyrighted, or yt-dlp failed.";
pub const MSG_PARSE_FAILED: &str = "Failed to parse video information from yt-dlp.";
pub const MSG_INVALID_FORMAT: &str = "Invalid format ID.";
pub const MSG_BAD_QUERY: &str = "Invalid request parameters";

/// An error as the client sees it: `{"error": message}` with a status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }

    pub fn invalid_action() -> Self {
        Self::bad_request(MSG_INVALID_ACTION)
    }
}

impl From<TubefetchError> for ApiError {
    fn from(err: TubefetchError) -> Self {
        let status = if err.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        let message = match err {
            TubefetchError::Validation(e) => e.message(),
            TubefetchError::InvalidFormatSelector(raw) => {
                warn!("Rejected format selector {:?}", raw);
                MSG_INVALID_FORMAT.to_string()
            }
            // The excerpt is yt-dlp's own reason ("Private video", ...)
            err @ TubefetchError::ToolReported(_) => {
                warn!("{}", err);
                err.to_string()
            }
            // Payload excerpt was already logged by the parser
            TubefetchError::Parse(e) => {
                error!("Parse failure: {}", e);
                MSG_PARSE_FAILED.to_string()
            }
            other => {
                error!("yt-dlp call failed: {}", other);
                MSG_RETRIEVE_FAILED.to_string()
            }
        };

        Self { status, message }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::bad_request(err.message())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        warn!("Rejected query string: {}", rejection.body_text());
        Self::bad_request(format!("{}: {}", MSG_BAD_QUERY, rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}
