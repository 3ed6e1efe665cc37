use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Envelope for every JSON body the storefront-facing routes return.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub data: Option<T>,
    pub message: String,
    pub status: u16,
    pub timestamp: DateTime<Utc>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> ApiResponse<T> {
        Self::with_status(StatusCode::OK, data, message)
    }

    pub fn created(data: T, message: impl Into<String>) -> ApiResponse<T> {
        Self::with_status(StatusCode::CREATED, data, message)
    }

    /// 200 with `data: null`.
    pub fn ok_empty(message: impl Into<String>) -> ApiResponse<T> {
        ApiResponse {
            data: None,
            message: message.into(),
            status: StatusCode::OK.as_u16(),
            timestamp: Utc::now(),
        }
    }

    fn with_status(status: StatusCode, data: T, message: impl Into<String>) -> ApiResponse<T> {
        ApiResponse {
            data: Some(data),
            message: message.into(),
            status: status.as_u16(),
            timestamp: Utc::now(),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}
