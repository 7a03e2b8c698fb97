//! Repository for client accounts

use crate::error::DbError;
use kosa_common::models::{Client, ClientUpdate, NewClient};
use std::future::Future;

pub trait ClientRepository {
    fn init_schema(&self) -> impl Future<Output = Result<(), DbError>> + Send;

    /// Fails with [`DbError::UniqueViolation`] when the username is taken.
    fn insert(&self, client: NewClient) -> impl Future<Output = Result<Client, DbError>> + Send;

    fn find_by_id(&self, id: i64) -> impl Future<Output = Result<Option<Client>, DbError>> + Send;

    fn find_by_username(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<Option<Client>, DbError>> + Send;

    fn find_all(&self) -> impl Future<Output = Result<Vec<Client>, DbError>> + Send;

    fn update(
        &self,
        id: i64,
        update: ClientUpdate,
    ) -> impl Future<Output = Result<Option<Client>, DbError>> + Send;

    fn update_by_username(
        &self,
        username: &str,
        update: ClientUpdate,
    ) -> impl Future<Output = Result<Option<Client>, DbError>> + Send;

    fn update_password(
        &self,
        id: i64,
        password_hash: &str,
    ) -> impl Future<Output = Result<bool, DbError>> + Send;

    fn delete(&self, id: i64) -> impl Future<Output = Result<bool, DbError>> + Send;
}
