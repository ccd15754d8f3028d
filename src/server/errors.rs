// Request-boundary error classification
//
// Every failure a handler can hit ends up here and leaves as
// `{"error": "<message>"}` with a matching status code.

use axum::extract::rejection::BytesRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use super::types::ErrorBody;
use crate::inference::InferenceError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Body was not JSON or had no usable `message`
    #[error("Invalid input")]
    InvalidInput,

    /// Body could not be read, e.g. it exceeded the size limit
    #[error("{}", .0.body_text())]
    Body(#[from] BytesRejection),

    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error(transparent)]
    Persistence(#[from] StoreError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput => StatusCode::BAD_REQUEST,
            // 413 for oversized bodies, 400 for anything else axum reports
            ApiError::Body(rejection) => rejection.status(),
            ApiError::Inference(_) | ApiError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
