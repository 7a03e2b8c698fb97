use kosa_common::{external_service_error, KosaError};
use kosa_db::DbError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("Requested time slot is no longer available")]
    SlotTaken,
    #[error("Invalid booking request: {0}")]
    Validation(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("Calendar error: {0}")]
    Calendar(String),
    #[error("Calendar event for appointment {0} not found")]
    MirrorMissing(i64),
    #[error("Calendar lookup for appointment {0} matched {1} events")]
    MirrorAmbiguous(i64, usize),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error(transparent)]
    Db(#[from] DbError),
}

impl BookingError {
    pub fn not_found(what: impl Into<String>) -> Self {
        BookingError::NotFound(what.into())
    }
}

impl From<BookingError> for KosaError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::NotFound(_) => KosaError::NotFoundError(err.to_string()),
            BookingError::SlotTaken => KosaError::ConflictError(err.to_string()),
            BookingError::Validation(msg) => KosaError::ValidationError(msg),
            BookingError::Forbidden(msg) => KosaError::ForbiddenError(msg),
            BookingError::Calendar(_)
            | BookingError::MirrorMissing(_)
            | BookingError::MirrorAmbiguous(..) => {
                external_service_error("google-calendar", err.to_string())
            }
            BookingError::Config(msg) => KosaError::ConfigError(msg),
            BookingError::Db(db) => db.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kosa_common::HttpStatusCode;

    #[test]
    fn maps_onto_http_taxonomy() {
        let status = |e: BookingError| KosaError::from(e).status_code();
        assert_eq!(status(BookingError::not_found("Barber 3")), 404);
        assert_eq!(status(BookingError::SlotTaken), 409);
        assert_eq!(status(BookingError::Validation("bad".into())), 400);
        assert_eq!(status(BookingError::Forbidden("no".into())), 403);
        assert_eq!(status(BookingError::MirrorMissing(1)), 502);
        assert_eq!(status(BookingError::MirrorAmbiguous(1, 2)), 502);
        assert_eq!(status(BookingError::Db(DbError::QueryError("x".into()))), 500);
    }
}
