use axum::Json;
use axum::http::StatusCode;

use crate::api::models::{ErrorResponse, SummaryResponse};

pub fn success(summary: String) -> (StatusCode, Json<SummaryResponse>) {
    (StatusCode::OK, Json(SummaryResponse { summary }))
}

pub fn error(status: StatusCode, message: String) -> (StatusCode, Json<ErrorResponse>) {
    (status, Json(ErrorResponse { error: message }))
}
