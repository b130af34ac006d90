use actix_web::http::StatusCode;
use bigdecimal::BigDecimal;
use thiserror::Error;

use crate::database::StoreError;
use crate::money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Invalid email or password. Please try again.")]
    InvalidCredentials,
    #[error("User with this email already exists")]
    EmailInUse,
    #[error("Please enter a valid email address")]
    InvalidEmail,
    #[error("Please use a stronger password (mix of uppercase, lowercase, numbers, and symbols)")]
    WeakPassword,
    #[error("Passwords do not match")]
    PasswordMismatch,
    #[error("Password must be at least 6 characters long")]
    PasswordTooShort,
    #[error("Name must be at least 2 characters long")]
    NameTooShort,
    #[error("Please fill in all fields")]
    MissingFields,
    #[error("Too many failed sign-in attempts. Please try again later.")]
    TooManyRequests,
    #[error("This account signs in with a different provider")]
    ProviderMismatch,
    #[error("This email address is reserved")]
    EmailReserved,
}

impl AuthError {
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "invalid-credentials",
            AuthError::EmailInUse => "email-in-use",
            AuthError::InvalidEmail => "invalid-email",
            AuthError::WeakPassword => "weak-password",
            AuthError::PasswordMismatch => "password-mismatch",
            AuthError::PasswordTooShort => "password-too-short",
            AuthError::NameTooShort => "name-too-short",
            AuthError::MissingFields => "missing-fields",
            AuthError::TooManyRequests => "too-many-requests",
            AuthError::ProviderMismatch => "provider-mismatch",
            AuthError::EmailReserved => "email-reserved",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AuthError::InvalidCredentials | AuthError::ProviderMismatch => StatusCode::UNAUTHORIZED,
            AuthError::EmailInUse => StatusCode::CONFLICT,
            AuthError::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            AuthError::EmailReserved => StatusCode::FORBIDDEN,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Invalid value for {0}")]
    BadParameter(String),
    #[error(
        "Insufficient credit. You need {} but have {}.",
        money::format_jod(.needed),
        money::format_jod(.available)
    )]
    InsufficientCredit { needed: BigDecimal, available: BigDecimal },
    #[error("{room} admits {min}-{max} people, requested {guests}")]
    CapacityViolation { room: String, guests: u32, min: u32, max: u32 },
    #[error("Please sign in first")]
    Unauthorized,
    #[error("You do not have access to this page")]
    Forbidden,
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn bad_parameter(name: &str) -> Self {
        ServiceError::BadParameter(name.to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::BadParameter(_) => StatusCode::BAD_REQUEST,
            ServiceError::InsufficientCredit { .. } => StatusCode::PAYMENT_REQUIRED,
            ServiceError::CapacityViolation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ServiceError::Unauthorized => StatusCode::UNAUTHORIZED,
            ServiceError::Forbidden => StatusCode::FORBIDDEN,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::Auth(e) => e.status(),
            ServiceError::Storage(_) | ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Storage and internal failures are never shown to clients verbatim.
    pub fn public_message(&self) -> String {
        match self {
            ServiceError::Storage(_) | ServiceError::Internal(_) => {
                "An error occurred. Please try again.".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(e: serde_json::Error) -> Self {
        ServiceError::Storage(e.into())
    }
}
