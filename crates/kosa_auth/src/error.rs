use kosa_common::KosaError;
use kosa_db::DbError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Missing credentials")]
    MissingCredentials,
    #[error("Invalid credentials")]
    WrongCredentials,
    #[error("Invalid or expired token: {0}")]
    InvalidToken(String),
    #[error("Username already taken")]
    UsernameTaken,
    #[error("Account no longer exists")]
    UnknownPrincipal,
    #[error("{0}")]
    Forbidden(String),
    #[error("Password hashing failed: {0}")]
    Hashing(String),
    #[error("Auth configuration error: {0}")]
    Config(String),
    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<AuthError> for KosaError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingCredentials
            | AuthError::WrongCredentials
            | AuthError::InvalidToken(_)
            | AuthError::UnknownPrincipal => KosaError::AuthError(err.to_string()),
            AuthError::UsernameTaken => KosaError::ConflictError(err.to_string()),
            AuthError::Forbidden(msg) => KosaError::ForbiddenError(msg),
            AuthError::Hashing(msg) => KosaError::InternalError(msg),
            AuthError::Config(msg) => KosaError::ConfigError(msg),
            AuthError::Db(db) => db.into(),
        }
    }
}
