use std::fmt;
use thiserror::Error;

/// The base error type for all Kosa errors.
///
/// Every crate converts its own error enum into this one at the HTTP boundary.
#[derive(Error, Debug)]
pub enum KosaError {
    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Missing, invalid or expired credentials
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// Authenticated, but not allowed to do this
    #[error("Forbidden: {0}")]
    ForbiddenError(String),

    /// Bad input
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Storage failure
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// The calendar collaborator (or another upstream) failed
    #[error("External service error: {service_name} - {message}")]
    ExternalServiceError {
        service_name: String,
        message: String,
    },

    /// e.g. username taken, slot already booked
    #[error("Conflict: {0}")]
    ConflictError(String),

    #[error("Not found: {0}")]
    NotFoundError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

/// A trait for converting errors to HTTP status codes.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for KosaError {
    fn status_code(&self) -> u16 {
        match self {
            KosaError::ConfigError(_) => 500,
            KosaError::AuthError(_) => 401,
            KosaError::ForbiddenError(_) => 403,
            KosaError::ValidationError(_) => 400,
            KosaError::DatabaseError(_) => 500,
            KosaError::ExternalServiceError { .. } => 502,
            KosaError::ConflictError(_) => 409,
            KosaError::NotFoundError(_) => 404,
            KosaError::InternalError(_) => 500,
        }
    }
}

impl From<serde_json::Error> for KosaError {
    fn from(err: serde_json::Error) -> Self {
        KosaError::ValidationError(err.to_string())
    }
}

impl From<std::io::Error> for KosaError {
    fn from(err: std::io::Error) -> Self {
        KosaError::InternalError(err.to_string())
    }
}

// Utility functions for error handling
pub fn config_error<T: fmt::Display>(message: T) -> KosaError {
    KosaError::ConfigError(message.to_string())
}

pub fn validation_error<T: fmt::Display>(message: T) -> KosaError {
    KosaError::ValidationError(message.to_string())
}

pub fn auth_error<T: fmt::Display>(message: T) -> KosaError {
    KosaError::AuthError(message.to_string())
}

pub fn forbidden<T: fmt::Display>(message: T) -> KosaError {
    KosaError::ForbiddenError(message.to_string())
}

pub fn not_found<T: fmt::Display>(message: T) -> KosaError {
    KosaError::NotFoundError(message.to_string())
}

pub fn conflict<T: fmt::Display>(message: T) -> KosaError {
    KosaError::ConflictError(message.to_string())
}

pub fn external_service_error<T: fmt::Display>(service_name: &str, message: T) -> KosaError {
    KosaError::ExternalServiceError {
        service_name: service_name.to_string(),
        message: message.to_string(),
    }
}

pub fn internal_error<T: fmt::Display>(message: T) -> KosaError {
    KosaError::InternalError(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_the_taxonomy() {
        assert_eq!(not_found("appointment 7").status_code(), 404);
        assert_eq!(conflict("slot taken").status_code(), 409);
        assert_eq!(validation_error("bad date").status_code(), 400);
        assert_eq!(auth_error("expired").status_code(), 401);
        assert_eq!(forbidden("barbers only").status_code(), 403);
        assert_eq!(external_service_error("calendar", "down").status_code(), 502);
        assert_eq!(internal_error("boom").status_code(), 500);
    }

    #[test]
    fn external_error_names_the_service() {
        let err = external_service_error("google-calendar", "quota exceeded");
        assert_eq!(
            err.to_string(),
            "External service error: google-calendar - quota exceeded"
        );
    }
}
