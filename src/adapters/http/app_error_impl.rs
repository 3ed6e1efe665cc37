use crate::app_error::{AppError, ErrorCode};
use axum::Json;
use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the error before it gets converted into a status response.
        tracing::error!(error = ?self, "Request failed");

        let code = self.code();
        match self {
            AppError::Database(_) => error_resp(StatusCode::INTERNAL_SERVER_ERROR, code, None),
            AppError::InvalidCredentials => error_resp(
                StatusCode::UNAUTHORIZED,
                code,
                Some("Invalid email or password".into()),
            ),
            AppError::InvalidToken => error_resp(
                StatusCode::UNAUTHORIZED,
                code,
                Some("Invalid or expired token".into()),
            ),
            AppError::InvalidInput(msg) => error_resp(StatusCode::BAD_REQUEST, code, Some(msg)),
            AppError::NotFound => error_resp(StatusCode::NOT_FOUND, code, None),
            AppError::DuplicateSubscription => error_resp(
                StatusCode::BAD_REQUEST,
                code,
                Some("User already has an active subscription".into()),
            ),
            AppError::PaymentMethodInvalid => error_resp(
                StatusCode::BAD_REQUEST,
                code,
                Some("Invalid payment method".into()),
            ),
            err @ AppError::PaymentDeclined(_) => {
                error_resp(StatusCode::BAD_REQUEST, code, Some(err.to_string()))
            }
            AppError::Conflict(msg) => error_resp(StatusCode::CONFLICT, code, Some(msg)),
            AppError::Internal(_) => error_resp(StatusCode::INTERNAL_SERVER_ERROR, code, None),
        }
    }
}

// Extractor rejections, used through `WithRejection<_, AppError>`, so a
// malformed body, path or query gets the same envelope as any other 400.

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

fn error_resp(status: StatusCode, code: ErrorCode, message: Option<String>) -> Response {
    let message = message.unwrap_or_else(|| default_message(code).to_string());
    let body = serde_json::json!({
        "code": code.as_str(),
        "message": message,
        "status": status.as_u16(),
        "timestamp": Utc::now(),
        "data": null,
    });
    (status, Json(body)).into_response()
}

fn default_message(code: ErrorCode) -> &'static str {
    match code {
        ErrorCode::NotFound => "Resource not found",
        ErrorCode::DatabaseError | ErrorCode::InternalError => "Internal server error",
        _ => "Request failed",
    }
}
