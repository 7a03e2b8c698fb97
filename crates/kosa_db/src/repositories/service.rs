//! Repository for the service catalog

use crate::error::DbError;
use kosa_common::models::{NewService, Service};
use std::future::Future;

pub trait ServiceRepository {
    fn init_schema(&self) -> impl Future<Output = Result<(), DbError>> + Send;

    fn insert(&self, service: NewService) -> impl Future<Output = Result<Service, DbError>> + Send;

    fn find_by_id(&self, id: i64) -> impl Future<Output = Result<Option<Service>, DbError>> + Send;

    fn find_all(&self) -> impl Future<Output = Result<Vec<Service>, DbError>> + Send;

    fn update(
        &self,
        id: i64,
        service: NewService,
    ) -> impl Future<Output = Result<Option<Service>, DbError>> + Send;

    fn delete(&self, id: i64) -> impl Future<Output = Result<bool, DbError>> + Send;
}
