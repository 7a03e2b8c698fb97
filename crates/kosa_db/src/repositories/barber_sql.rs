//! SQL implementation of the barber repository

use crate::error::DbError;
use crate::repositories::barber::BarberRepository;
use crate::repositories::columns::{hour, int, opt_text, text};
use crate::DbClient;
use kosa_common::models::{AvailabilityMode, Barber, BarberUpdate, NewBarber};
use sqlx::any::AnyRow;
use tracing::{debug, error, info};

const COLUMNS: &str = "id, username, password_hash, name, surname, phone, work_start_hour, \
                       work_end_hour, booking_window_days, availability, \
                       COALESCE(calendar_id, '') AS calendar_id";

#[derive(Debug, Clone)]
pub struct SqlBarberRepository {
    db_client: DbClient,
}

impl SqlBarberRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }
}

fn barber_from_row(row: &AnyRow) -> Result<Barber, DbError> {
    let availability = text(row, "availability")?
        .parse::<AvailabilityMode>()
        .map_err(|e| DbError::decode("availability", e))?;
    Ok(Barber {
        id: int(row, "id")?,
        username: text(row, "username")?,
        password_hash: text(row, "password_hash")?,
        name: text(row, "name")?,
        surname: text(row, "surname")?,
        phone: text(row, "phone")?,
        work_start_hour: hour(row, "work_start_hour")?,
        work_end_hour: hour(row, "work_end_hour")?,
        booking_window_days: int(row, "booking_window_days")?,
        availability,
        calendar_id: opt_text(row, "calendar_id")?,
    })
}

impl BarberRepository for SqlBarberRepository {
    async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing barber schema");
        let query = r#"
            CREATE TABLE IF NOT EXISTS barbers (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                name TEXT NOT NULL,
                surname TEXT NOT NULL DEFAULT '',
                phone TEXT NOT NULL DEFAULT '',
                work_start_hour INTEGER NOT NULL,
                work_end_hour INTEGER NOT NULL,
                booking_window_days INTEGER NOT NULL,
                availability TEXT NOT NULL DEFAULT 'All',
                calendar_id TEXT NULL
            )
        "#;
        self.db_client.execute(query).await?;
        info!("Barber schema initialized successfully");
        Ok(())
    }

    async fn insert(&self, barber: NewBarber) -> Result<Barber, DbError> {
        debug!("Inserting barber {}", barber.username);
        let query = format!(
            "INSERT INTO barbers (username, password_hash, name, surname, phone, work_start_hour, \
             work_end_hour, booking_window_days, availability, calendar_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING {COLUMNS}"
        );
        let row = sqlx::query(&query)
            .bind(&barber.username)
            .bind(&barber.password_hash)
            .bind(&barber.name)
            .bind(&barber.surname)
            .bind(&barber.phone)
            .bind(i64::from(barber.work_start_hour))
            .bind(i64::from(barber.work_end_hour))
            .bind(barber.booking_window_days)
            .bind(barber.availability.as_str())
            .bind(barber.calendar_id.as_deref())
            .fetch_one(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to insert barber: {}", e);
                DbError::from_query(e)
            })?;
        barber_from_row(&row)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Barber>, DbError> {
        let query = format!("SELECT {COLUMNS} FROM barbers WHERE id = $1");
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(DbError::from_query)?;
        row.as_ref().map(barber_from_row).transpose()
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Barber>, DbError> {
        let query = format!("SELECT {COLUMNS} FROM barbers WHERE username = $1");
        let row = sqlx::query(&query)
            .bind(username)
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(DbError::from_query)?;
        row.as_ref().map(barber_from_row).transpose()
    }

    async fn find_all(&self) -> Result<Vec<Barber>, DbError> {
        let query = format!("SELECT {COLUMNS} FROM barbers ORDER BY id");
        let rows = sqlx::query(&query)
            .fetch_all(self.db_client.pool())
            .await
            .map_err(DbError::from_query)?;
        rows.iter().map(barber_from_row).collect()
    }

    async fn update(&self, id: i64, update: BarberUpdate) -> Result<Option<Barber>, DbError> {
        let query = format!(
            "UPDATE barbers SET name = $1, surname = $2, phone = $3, work_start_hour = $4, \
             work_end_hour = $5, booking_window_days = $6, availability = $7, calendar_id = $8 \
             WHERE id = $9 RETURNING {COLUMNS}"
        );
        let row = sqlx::query(&query)
            .bind(&update.name)
            .bind(&update.surname)
            .bind(&update.phone)
            .bind(i64::from(update.work_start_hour))
            .bind(i64::from(update.work_end_hour))
            .bind(update.booking_window_days)
            .bind(update.availability.as_str())
            .bind(update.calendar_id.as_deref())
            .bind(id)
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(DbError::from_query)?;
        row.as_ref().map(barber_from_row).transpose()
    }

    async fn update_password(&self, id: i64, password_hash: &str) -> Result<bool, DbError> {
        let result = sqlx::query("UPDATE barbers SET password_hash = $1 WHERE id = $2")
            .bind(password_hash)
            .bind(id)
            .execute(self.db_client.pool())
            .await
            .map_err(DbError::from_query)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: i64) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM barbers WHERE id = $1")
            .bind(id)
            .execute(self.db_client.pool())
            .await
            .map_err(DbError::from_query)?;
        Ok(result.rows_affected() > 0)
    }
}
