use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};

use crate::errors::Error;

const INTERNAL_REASON: &str = "An unexpected error occurred";
const INTERNAL_SOLUTION: &str =
    "Try again later. If the problem persists contact the service operator";

/// Error returned by every handler
#[derive(Debug)]
pub enum ApiError {
    BadRequest { reason: String, solution: String },
    NotFound { reason: String, solution: String },
    /// Details are logged when the error is converted, never sent to the client
    Internal,
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON body of every error response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub status: String,
    pub reason: String,
    pub solution: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let body = match self {
            ApiError::BadRequest { reason, solution } => {
                ErrorBody { status: "Bad Request".to_string(), reason, solution }
            }
            ApiError::NotFound { reason, solution } => {
                ErrorBody { status: "Not found".to_string(), reason, solution }
            }
            ApiError::Internal => ErrorBody {
                status: "Internal Server Error".to_string(),
                reason: INTERNAL_REASON.to_string(),
                solution: INTERNAL_SOLUTION.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::BadRequest { reason, solution } => {
                tracing::info!(reason = %reason, "Rejected bad request");
                ApiError::BadRequest { reason, solution }
            }
            Error::NotFound { reason, solution } => {
                tracing::info!(reason = %reason, "Requested resource not found");
                ApiError::NotFound { reason, solution }
            }
            other => {
                tracing::error!(
                    error = %other,
                    details = ?other,
                    "Request failed with internal error"
                );
                ApiError::Internal
            }
        }
    }
}
