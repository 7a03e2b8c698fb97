use kosa_auth::AuthError;
use kosa_common::KosaError;
use kosa_db::DbError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("Invalid request: {0}")]
    Validation(String),
    #[error("Username already taken")]
    UsernameTaken,
    #[error("{0}")]
    Forbidden(String),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Db(DbError),
}

impl From<DbError> for DirectoryError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::UniqueViolation(_) => DirectoryError::UsernameTaken,
            other => DirectoryError::Db(other),
        }
    }
}

impl From<DirectoryError> for KosaError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::NotFound(_) => KosaError::NotFoundError(err.to_string()),
            DirectoryError::Validation(msg) => KosaError::ValidationError(msg),
            DirectoryError::UsernameTaken => KosaError::ConflictError(err.to_string()),
            DirectoryError::Forbidden(msg) => KosaError::ForbiddenError(msg),
            DirectoryError::Auth(auth) => auth.into(),
            DirectoryError::Db(db) => db.into(),
        }
    }
}
