use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found")]
    NotFound,

    #[error("User already has an active subscription")]
    DuplicateSubscription,

    #[error("Invalid payment method")]
    PaymentMethodInvalid,

    #[error("Payment failed: {0}")]
    PaymentDeclined(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCode {
    DatabaseError,
    InvalidCredentials,
    InvalidToken,
    InvalidInput,
    NotFound,
    DuplicateSubscription,
    PaymentMethodInvalid,
    PaymentDeclined,
    Conflict,
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::InvalidCredentials => "INVALID_CREDENTIALS",
            ErrorCode::InvalidToken => "INVALID_TOKEN",
            ErrorCode::InvalidInput => "INVALID_INPUT",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::DuplicateSubscription => "DUPLICATE_SUBSCRIPTION",
            ErrorCode::PaymentMethodInvalid => "PAYMENT_METHOD_INVALID",
            ErrorCode::PaymentDeclined => "PAYMENT_DECLINED",
            ErrorCode::Conflict => "CONFLICT",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl AppError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Database(_) => ErrorCode::DatabaseError,
            AppError::InvalidCredentials => ErrorCode::InvalidCredentials,
            AppError::InvalidToken => ErrorCode::InvalidToken,
            AppError::InvalidInput(_) => ErrorCode::InvalidInput,
            AppError::NotFound => ErrorCode::NotFound,
            AppError::DuplicateSubscription => ErrorCode::DuplicateSubscription,
            AppError::PaymentMethodInvalid => ErrorCode::PaymentMethodInvalid,
            AppError::PaymentDeclined(_) => ErrorCode::PaymentDeclined,
            AppError::Conflict(_) => ErrorCode::Conflict,
            AppError::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// Conflict-class failures: the request clashes with current state.
    pub fn is_conflict(&self) -> bool {
        matches!(self, AppError::DuplicateSubscription | AppError::Conflict(_))
    }
}

pub type AppResult<T> = Result<T, AppError>;
