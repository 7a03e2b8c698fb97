//! SQL implementation of the service repository

use crate::error::DbError;
use crate::repositories::columns::{int, text};
use crate::repositories::service::ServiceRepository;
use crate::DbClient;
use kosa_common::models::{NewService, Service};
use sqlx::any::AnyRow;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct SqlServiceRepository {
    db_client: DbClient,
}

impl SqlServiceRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }
}

fn service_from_row(row: &AnyRow) -> Result<Service, DbError> {
    Ok(Service {
        id: int(row, "id")?,
        name: text(row, "name")?,
        duration_minutes: int(row, "duration")?,
        price: int(row, "price")?,
    })
}

impl ServiceRepository for SqlServiceRepository {
    async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing service schema");
        let query = r#"
            CREATE TABLE IF NOT EXISTS services (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                duration INTEGER NOT NULL,
                price INTEGER NOT NULL
            )
        "#;
        self.db_client.execute(query).await?;
        info!("Service schema initialized successfully");
        Ok(())
    }

    async fn insert(&self, service: NewService) -> Result<Service, DbError> {
        let row = sqlx::query(
            "INSERT INTO services (name, duration, price) VALUES ($1, $2, $3) \
             RETURNING id, name, duration, price",
        )
        .bind(&service.name)
        .bind(service.duration_minutes)
        .bind(service.price)
        .fetch_one(self.db_client.pool())
        .await
        .map_err(DbError::from_query)?;
        service_from_row(&row)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Service>, DbError> {
        let row = sqlx::query("SELECT id, name, duration, price FROM services WHERE id = $1")
            .bind(id)
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(DbError::from_query)?;
        row.as_ref().map(service_from_row).transpose()
    }

    async fn find_all(&self) -> Result<Vec<Service>, DbError> {
        let rows = sqlx::query("SELECT id, name, duration, price FROM services ORDER BY id")
            .fetch_all(self.db_client.pool())
            .await
            .map_err(DbError::from_query)?;
        rows.iter().map(service_from_row).collect()
    }

    async fn update(&self, id: i64, service: NewService) -> Result<Option<Service>, DbError> {
        let row = sqlx::query(
            "UPDATE services SET name = $1, duration = $2, price = $3 WHERE id = $4 \
             RETURNING id, name, duration, price",
        )
        .bind(&service.name)
        .bind(service.duration_minutes)
        .bind(service.price)
        .bind(id)
        .fetch_optional(self.db_client.pool())
        .await
        .map_err(DbError::from_query)?;
        row.as_ref().map(service_from_row).transpose()
    }

    async fn delete(&self, id: i64) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM services WHERE id = $1")
            .bind(id)
            .execute(self.db_client.pool())
            .await
            .map_err(DbError::from_query)?;
        Ok(result.rows_affected() > 0)
    }
}
