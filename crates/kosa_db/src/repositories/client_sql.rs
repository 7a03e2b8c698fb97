//! SQL implementation of the client repository

use crate::error::DbError;
use crate::repositories::client::ClientRepository;
use crate::repositories::columns::{int, opt_text, text};
use crate::DbClient;
use kosa_common::models::{Client, ClientUpdate, NewClient};
use sqlx::any::AnyRow;
use tracing::{debug, error, info};

const COLUMNS: &str = "id, username, password_hash, name, surname, phone, \
                       COALESCE(email, '') AS email, is_vip";

#[derive(Debug, Clone)]
pub struct SqlClientRepository {
    db_client: DbClient,
}

impl SqlClientRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }
}

// Flags are stored as 0/1 integers; Any cannot decode SQLite booleans.
fn client_from_row(row: &AnyRow) -> Result<Client, DbError> {
    Ok(Client {
        id: int(row, "id")?,
        username: text(row, "username")?,
        password_hash: text(row, "password_hash")?,
        name: text(row, "name")?,
        surname: text(row, "surname")?,
        phone: text(row, "phone")?,
        email: opt_text(row, "email")?,
        is_vip: int(row, "is_vip")? != 0,
    })
}

impl ClientRepository for SqlClientRepository {
    async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing client schema");
        let query = r#"
            CREATE TABLE IF NOT EXISTS clients (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                name TEXT NOT NULL,
                surname TEXT NOT NULL DEFAULT '',
                phone TEXT NOT NULL DEFAULT '',
                email TEXT NULL,
                is_vip INTEGER NOT NULL DEFAULT 0
            )
        "#;
        self.db_client.execute(query).await?;
        info!("Client schema initialized successfully");
        Ok(())
    }

    async fn insert(&self, client: NewClient) -> Result<Client, DbError> {
        debug!("Inserting client {}", client.username);
        let query = format!(
            "INSERT INTO clients (username, password_hash, name, surname, phone, email, is_vip) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {COLUMNS}"
        );
        let row = sqlx::query(&query)
            .bind(&client.username)
            .bind(&client.password_hash)
            .bind(&client.name)
            .bind(&client.surname)
            .bind(&client.phone)
            .bind(client.email.as_deref())
            .bind(i64::from(client.is_vip))
            .fetch_one(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to insert client: {}", e);
                DbError::from_query(e)
            })?;
        client_from_row(&row)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Client>, DbError> {
        let query = format!("SELECT {COLUMNS} FROM clients WHERE id = $1");
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(DbError::from_query)?;
        row.as_ref().map(client_from_row).transpose()
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Client>, DbError> {
        let query = format!("SELECT {COLUMNS} FROM clients WHERE username = $1");
        let row = sqlx::query(&query)
            .bind(username)
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(DbError::from_query)?;
        row.as_ref().map(client_from_row).transpose()
    }

    async fn find_all(&self) -> Result<Vec<Client>, DbError> {
        let query = format!("SELECT {COLUMNS} FROM clients ORDER BY id");
        let rows = sqlx::query(&query)
            .fetch_all(self.db_client.pool())
            .await
            .map_err(DbError::from_query)?;
        rows.iter().map(client_from_row).collect()
    }

    async fn update(&self, id: i64, update: ClientUpdate) -> Result<Option<Client>, DbError> {
        let query = format!(
            "UPDATE clients SET name = $1, surname = $2, phone = $3, email = $4, is_vip = $5 \
             WHERE id = $6 RETURNING {COLUMNS}"
        );
        let row = sqlx::query(&query)
            .bind(&update.name)
            .bind(&update.surname)
            .bind(&update.phone)
            .bind(update.email.as_deref())
            .bind(i64::from(update.is_vip))
            .bind(id)
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(DbError::from_query)?;
        row.as_ref().map(client_from_row).transpose()
    }

    async fn update_by_username(
        &self,
        username: &str,
        update: ClientUpdate,
    ) -> Result<Option<Client>, DbError> {
        let query = format!(
            "UPDATE clients SET name = $1, surname = $2, phone = $3, email = $4, is_vip = $5 \
             WHERE username = $6 RETURNING {COLUMNS}"
        );
        let row = sqlx::query(&query)
            .bind(&update.name)
            .bind(&update.surname)
            .bind(&update.phone)
            .bind(update.email.as_deref())
            .bind(i64::from(update.is_vip))
            .bind(username)
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(DbError::from_query)?;
        row.as_ref().map(client_from_row).transpose()
    }

    async fn update_password(&self, id: i64, password_hash: &str) -> Result<bool, DbError> {
        let result = sqlx::query("UPDATE clients SET password_hash = $1 WHERE id = $2")
            .bind(password_hash)
            .bind(id)
            .execute(self.db_client.pool())
            .await
            .map_err(DbError::from_query)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: i64) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(self.db_client.pool())
            .await
            .map_err(DbError::from_query)?;
        Ok(result.rows_affected() > 0)
    }
}
