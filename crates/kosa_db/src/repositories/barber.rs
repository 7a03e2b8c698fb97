//! Repository for barbers

use crate::error::DbError;
use kosa_common::models::{Barber, BarberUpdate, NewBarber};
use std::future::Future;

pub trait BarberRepository {
    fn init_schema(&self) -> impl Future<Output = Result<(), DbError>> + Send;

    /// Fails with [`DbError::UniqueViolation`] when the username is taken.
    fn insert(&self, barber: NewBarber) -> impl Future<Output = Result<Barber, DbError>> + Send;

    fn find_by_id(&self, id: i64) -> impl Future<Output = Result<Option<Barber>, DbError>> + Send;

    fn find_by_username(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<Option<Barber>, DbError>> + Send;

    fn find_all(&self) -> impl Future<Output = Result<Vec<Barber>, DbError>> + Send;

    fn update(
        &self,
        id: i64,
        update: BarberUpdate,
    ) -> impl Future<Output = Result<Option<Barber>, DbError>> + Send;

    fn update_password(
        &self,
        id: i64,
        password_hash: &str,
    ) -> impl Future<Output = Result<bool, DbError>> + Send;

    fn delete(&self, id: i64) -> impl Future<Output = Result<bool, DbError>> + Send;
}
