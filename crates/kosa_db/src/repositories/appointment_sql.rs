//! SQL implementation of the appointment repository

use crate::error::DbError;
use crate::repositories::appointment::AppointmentRepository;
use crate::repositories::columns::{
    date, format_date, format_time, format_timestamp, int, opt_int, opt_text, text, time,
    timestamp,
};
use crate::DbClient;
use chrono::{DateTime, NaiveDate, Utc};
use kosa_common::models::{
    Appointment, AppointmentKind, BarberAppointmentDetail, ClientAppointmentDetail,
    NewAppointment, StaleEvent, SyncStatus,
};
use sqlx::any::AnyRow;
use tracing::{debug, error, info};

const KIND_BOOKING: &str = "booking";
const KIND_BREAK: &str = "break";

const COLUMNS: &str = "id, date, time, duration, barber_id, \
                       COALESCE(client_id, -1) AS client_id, COALESCE(service_id, -1) AS service_id, \
                       kind, note, sync_status, COALESCE(calendar_event_id, '') AS calendar_event_id, \
                       COALESCE(stale_calendar_id, '') AS stale_calendar_id, \
                       COALESCE(stale_event_id, '') AS stale_event_id, created_at";

#[derive(Debug, Clone)]
pub struct SqlAppointmentRepository {
    db_client: DbClient,
}

impl SqlAppointmentRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }
}

fn kind_columns(kind: &AppointmentKind) -> (&'static str, Option<i64>, Option<i64>, &str) {
    match kind {
        AppointmentKind::Booking {
            client_id,
            service_id,
            note,
        } => (KIND_BOOKING, Some(*client_id), Some(*service_id), note),
        AppointmentKind::Break { reason } => (KIND_BREAK, None, None, reason),
    }
}

fn appointment_from_row(row: &AnyRow) -> Result<Appointment, DbError> {
    let note = text(row, "note")?;
    let kind = match text(row, "kind")?.as_str() {
        KIND_BOOKING => {
            let client_id = opt_int(row, "client_id")?
                .ok_or_else(|| DbError::decode("client_id", "booking without client"))?;
            let service_id = opt_int(row, "service_id")?
                .ok_or_else(|| DbError::decode("service_id", "booking without service"))?;
            AppointmentKind::Booking {
                client_id,
                service_id,
                note,
            }
        }
        KIND_BREAK => AppointmentKind::Break { reason: note },
        other => return Err(DbError::decode("kind", format!("unknown kind {other}"))),
    };
    let sync_status = text(row, "sync_status")?
        .parse::<SyncStatus>()
        .map_err(|e| DbError::decode("sync_status", e))?;
    let stale_event = match (
        opt_text(row, "stale_calendar_id")?,
        opt_text(row, "stale_event_id")?,
    ) {
        (Some(calendar_id), Some(event_id)) => Some(StaleEvent {
            calendar_id,
            event_id,
        }),
        _ => None,
    };

    Ok(Appointment {
        id: int(row, "id")?,
        date: date(row, "date")?,
        time: time(row, "time")?,
        duration_minutes: int(row, "duration")?,
        barber_id: int(row, "barber_id")?,
        kind,
        sync_status,
        calendar_event_id: opt_text(row, "calendar_event_id")?,
        stale_event,
        created_at: timestamp(row, "created_at")?,
    })
}

fn collect(rows: Vec<AnyRow>) -> Result<Vec<Appointment>, DbError> {
    rows.iter().map(appointment_from_row).collect()
}

impl AppointmentRepository for SqlAppointmentRepository {
    async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing appointment schema");

        let query = r#"
            CREATE TABLE IF NOT EXISTS appointments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                date TEXT NOT NULL,
                time TEXT NOT NULL,
                duration INTEGER NOT NULL,
                barber_id INTEGER NOT NULL,
                client_id INTEGER NULL,
                service_id INTEGER NULL,
                kind TEXT NOT NULL,
                note TEXT NOT NULL DEFAULT '',
                sync_status TEXT NOT NULL,
                calendar_event_id TEXT NULL,
                stale_calendar_id TEXT NULL,
                stale_event_id TEXT NULL,
                created_at TEXT NOT NULL
            )
        "#;
        self.db_client.execute(query).await?;
        self.db_client
            .execute(
                "CREATE INDEX IF NOT EXISTS idx_appointments_barber_date \
                 ON appointments (barber_id, date)",
            )
            .await?;

        info!("Appointment schema initialized successfully");
        Ok(())
    }

    async fn insert(&self, appointment: NewAppointment) -> Result<Appointment, DbError> {
        debug!(
            "Inserting appointment for barber {} on {} at {}",
            appointment.barber_id, appointment.date, appointment.time
        );
        let (kind, client_id, service_id, note) = kind_columns(&appointment.kind);

        let query = format!(
            "INSERT INTO appointments \
             (date, time, duration, barber_id, client_id, service_id, kind, note, sync_status, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING {COLUMNS}"
        );
        let row = sqlx::query(&query)
            .bind(format_date(appointment.date))
            .bind(format_time(appointment.time))
            .bind(appointment.duration_minutes)
            .bind(appointment.barber_id)
            .bind(client_id)
            .bind(service_id)
            .bind(kind)
            .bind(note)
            .bind(appointment.sync_status.as_str())
            .bind(format_timestamp(Utc::now()))
            .fetch_one(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to insert appointment: {}", e);
                DbError::from_query(e)
            })?;

        appointment_from_row(&row)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Appointment>, DbError> {
        let query = format!("SELECT {COLUMNS} FROM appointments WHERE id = $1");
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(DbError::from_query)?;

        row.as_ref().map(appointment_from_row).transpose()
    }

    async fn find_all(&self) -> Result<Vec<Appointment>, DbError> {
        let query = format!("SELECT {COLUMNS} FROM appointments ORDER BY date, time, id");
        let rows = sqlx::query(&query)
            .fetch_all(self.db_client.pool())
            .await
            .map_err(DbError::from_query)?;
        collect(rows)
    }

    async fn find_by_barber_and_date(
        &self,
        barber_id: i64,
        day: NaiveDate,
    ) -> Result<Vec<Appointment>, DbError> {
        let query = format!(
            "SELECT {COLUMNS} FROM appointments WHERE barber_id = $1 AND date = $2 ORDER BY time"
        );
        let rows = sqlx::query(&query)
            .bind(barber_id)
            .bind(format_date(day))
            .fetch_all(self.db_client.pool())
            .await
            .map_err(DbError::from_query)?;
        collect(rows)
    }

    async fn update(&self, appointment: &Appointment) -> Result<bool, DbError> {
        let (kind, client_id, service_id, note) = kind_columns(&appointment.kind);
        let result = sqlx::query(
            "UPDATE appointments SET date = $1, time = $2, duration = $3, barber_id = $4, \
             client_id = $5, service_id = $6, kind = $7, note = $8 WHERE id = $9",
        )
        .bind(format_date(appointment.date))
        .bind(format_time(appointment.time))
        .bind(appointment.duration_minutes)
        .bind(appointment.barber_id)
        .bind(client_id)
        .bind(service_id)
        .bind(kind)
        .bind(note)
        .bind(appointment.id)
        .execute(self.db_client.pool())
        .await
        .map_err(|e| {
            error!("Failed to update appointment {}: {}", appointment.id, e);
            DbError::from_query(e)
        })?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_sync_status(
        &self,
        id: i64,
        status: SyncStatus,
        calendar_event_id: Option<&str>,
    ) -> Result<bool, DbError> {
        let result = sqlx::query(
            "UPDATE appointments SET sync_status = $1, calendar_event_id = $2 WHERE id = $3",
        )
        .bind(status.as_str())
        .bind(calendar_event_id)
        .bind(id)
        .execute(self.db_client.pool())
        .await
        .map_err(DbError::from_query)?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_stale_event(&self, id: i64, stale: Option<&StaleEvent>) -> Result<bool, DbError> {
        let result = sqlx::query(
            "UPDATE appointments SET stale_calendar_id = $1, stale_event_id = $2 WHERE id = $3",
        )
        .bind(stale.map(|s| s.calendar_id.as_str()))
        .bind(stale.map(|s| s.event_id.as_str()))
        .bind(id)
        .execute(self.db_client.pool())
        .await
        .map_err(|e| {
            error!("Failed to record stale event for appointment {}: {}", id, e);
            DbError::from_query(e)
        })?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: i64) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM appointments WHERE id = $1")
            .bind(id)
            .execute(self.db_client.pool())
            .await
            .map_err(DbError::from_query)?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_latest(&self) -> Result<Option<Appointment>, DbError> {
        let query = format!(
            "DELETE FROM appointments WHERE id = (SELECT MAX(id) FROM appointments) \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query(&query)
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(DbError::from_query)?;

        row.as_ref().map(appointment_from_row).transpose()
    }

    async fn find_unsynced(&self, pending_before: DateTime<Utc>) -> Result<Vec<Appointment>, DbError> {
        let query = format!(
            "SELECT {COLUMNS} FROM appointments \
             WHERE sync_status = $1 OR (sync_status = $2 AND created_at <= $3) ORDER BY id"
        );
        let rows = sqlx::query(&query)
            .bind(SyncStatus::Failed.as_str())
            .bind(SyncStatus::Pending.as_str())
            .bind(format_timestamp(pending_before))
            .fetch_all(self.db_client.pool())
            .await
            .map_err(DbError::from_query)?;
        collect(rows)
    }

    async fn details_for_barber(&self, barber_id: i64) -> Result<Vec<BarberAppointmentDetail>, DbError> {
        let rows = sqlx::query(
            "SELECT a.id, a.date, a.time, a.duration, a.note, a.kind, \
                    COALESCE(c.name, '') AS client_name, \
                    COALESCE(c.surname, '') AS client_surname, \
                    COALESCE(c.phone, '') AS client_phone, \
                    COALESCE(s.name, '') AS service_name, \
                    COALESCE(s.price, -1) AS service_price \
             FROM appointments a \
             LEFT JOIN clients c ON a.client_id = c.id \
             LEFT JOIN services s ON a.service_id = s.id \
             WHERE a.barber_id = $1 ORDER BY a.date, a.time",
        )
        .bind(barber_id)
        .fetch_all(self.db_client.pool())
        .await
        .map_err(DbError::from_query)?;

        rows.iter()
            .map(|row| {
                Ok(BarberAppointmentDetail {
                    id: int(row, "id")?,
                    date: date(row, "date")?,
                    time: time(row, "time")?,
                    duration_minutes: int(row, "duration")?,
                    note: text(row, "note")?,
                    is_break: text(row, "kind")? == KIND_BREAK,
                    client_name: opt_text(row, "client_name")?,
                    client_surname: opt_text(row, "client_surname")?,
                    client_phone: opt_text(row, "client_phone")?,
                    service_name: opt_text(row, "service_name")?,
                    service_price: opt_int(row, "service_price")?,
                })
            })
            .collect()
    }

    async fn details_for_client(&self, client_id: i64) -> Result<Vec<ClientAppointmentDetail>, DbError> {
        let rows = sqlx::query(
            "SELECT a.id, a.date, a.time, a.duration, a.note, \
                    b.name AS barber_name, b.surname AS barber_surname, \
                    b.phone AS barber_phone, \
                    s.name AS service_name, s.price AS service_price \
             FROM appointments a \
             JOIN barbers b ON a.barber_id = b.id \
             JOIN services s ON a.service_id = s.id \
             WHERE a.client_id = $1 ORDER BY a.date, a.time",
        )
        .bind(client_id)
        .fetch_all(self.db_client.pool())
        .await
        .map_err(DbError::from_query)?;

        rows.iter()
            .map(|row| {
                Ok(ClientAppointmentDetail {
                    id: int(row, "id")?,
                    date: date(row, "date")?,
                    time: time(row, "time")?,
                    duration_minutes: int(row, "duration")?,
                    note: text(row, "note")?,
                    barber_name: text(row, "barber_name")?,
                    barber_surname: text(row, "barber_surname")?,
                    barber_phone: text(row, "barber_phone")?,
                    service_name: text(row, "service_name")?,
                    service_price: int(row, "service_price")?,
                })
            })
            .collect()
    }
}
