//! Repository for appointments
//!
//! Appointments of both kinds (client bookings and breaks) live in one table
//! so the overlap check reads a single timeline per barber and date.

use crate::error::DbError;
use chrono::{DateTime, NaiveDate, Utc};
use kosa_common::models::{
    Appointment, BarberAppointmentDetail, ClientAppointmentDetail, NewAppointment, StaleEvent,
    SyncStatus,
};
use std::future::Future;

pub trait AppointmentRepository {
    fn init_schema(&self) -> impl Future<Output = Result<(), DbError>> + Send;

    /// Insert a row and return it with its identifier.
    fn insert(
        &self,
        appointment: NewAppointment,
    ) -> impl Future<Output = Result<Appointment, DbError>> + Send;

    fn find_by_id(&self, id: i64) -> impl Future<Output = Result<Option<Appointment>, DbError>> + Send;

    fn find_all(&self) -> impl Future<Output = Result<Vec<Appointment>, DbError>> + Send;

    /// All appointments of a barber on a date, ordered by time.
    fn find_by_barber_and_date(
        &self,
        barber_id: i64,
        date: NaiveDate,
    ) -> impl Future<Output = Result<Vec<Appointment>, DbError>> + Send;

    /// Overwrite date, time, duration, barber and kind of an existing row.
    ///
    /// Returns `false` when no row has this id.
    fn update(&self, appointment: &Appointment) -> impl Future<Output = Result<bool, DbError>> + Send;

    fn set_sync_status(
        &self,
        id: i64,
        status: SyncStatus,
        calendar_event_id: Option<&str>,
    ) -> impl Future<Output = Result<bool, DbError>> + Send;

    /// Record (or with `None`, clear) a calendar event the row has left behind.
    fn set_stale_event(
        &self,
        id: i64,
        stale: Option<&StaleEvent>,
    ) -> impl Future<Output = Result<bool, DbError>> + Send;

    fn delete(&self, id: i64) -> impl Future<Output = Result<bool, DbError>> + Send;

    /// Delete the most recently created row and return it.
    fn delete_latest(&self) -> impl Future<Output = Result<Option<Appointment>, DbError>> + Send;

    /// Rows whose calendar mirror is missing: every `Failed` row plus
    /// `Pending` rows created at or before `pending_before`.
    fn find_unsynced(
        &self,
        pending_before: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<Appointment>, DbError>> + Send;

    fn details_for_barber(
        &self,
        barber_id: i64,
    ) -> impl Future<Output = Result<Vec<BarberAppointmentDetail>, DbError>> + Send;

    fn details_for_client(
        &self,
        client_id: i64,
    ) -> impl Future<Output = Result<Vec<ClientAppointmentDetail>, DbError>> + Send;
}
