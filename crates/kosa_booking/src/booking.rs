//! Booking orchestration.
//!
//! [`BookingService`] is the only writer that touches both the appointment
//! table and the external calendar. Every write goes to storage first; the
//! calendar mirror follows and its outcome is recorded in the row's
//! `sync_status`, so a failed mirror never loses a booking and
//! [`BookingService::reconcile`] can retry it later.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use kosa_common::models::{
    Appointment, AppointmentKind, AppointmentUpdate, BarberAppointmentDetail,
    ClientAppointmentDetail, NewAppointment, StaleEvent, SyncStatus,
};
use kosa_common::services::{BookedEvent, CalendarEvent, CalendarEventResult, SharedCalendar};
use kosa_config::AppConfig;
use kosa_db::{
    AppointmentRepository, BarberRepository, ClientRepository, ServiceRepository, Store,
};
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::error::BookingError;
use crate::locks::SlotLocks;
use crate::logic::{
    appointment_interval, booked_intervals, calculate_available_slots, days_in_range, is_free,
    parse_time_zone, resolve_local, AvailableSlot, WorkingHours,
};

/// Booking rules resolved from configuration.
#[derive(Debug, Clone)]
pub struct BookingSettings {
    pub time_zone: Tz,
    pub slot_interval: Duration,
    /// Reason given to breaks created without one.
    pub break_note: String,
    pub enforce_no_overlap: bool,
    /// How long a `Pending` row may wait for its mirror before reconciliation retries it.
    pub reconcile_grace: Duration,
    pub max_break_days: i64,
    /// Calendar used for barbers without their own.
    pub default_calendar_id: Option<String>,
}

impl BookingSettings {
    pub fn from_config(config: &AppConfig) -> Result<Self, BookingError> {
        let booking = &config.booking;
        if booking.slot_interval_minutes <= 0 {
            return Err(BookingError::Config(
                "booking.slot_interval_minutes must be positive".to_string(),
            ));
        }
        Ok(Self {
            time_zone: parse_time_zone(&booking.time_zone).map_err(BookingError::Config)?,
            slot_interval: Duration::minutes(booking.slot_interval_minutes),
            break_note: booking.break_note.clone(),
            enforce_no_overlap: booking.enforce_no_overlap,
            reconcile_grace: Duration::seconds(booking.reconcile_grace_secs.max(0)),
            max_break_days: booking.max_break_days,
            default_calendar_id: config
                .gcal
                .as_ref()
                .and_then(|gcal| gcal.calendar_id.clone())
                .filter(|id| !id.is_empty()),
        })
    }
}

/// A booking request after the HTTP layer has decoded it.
#[derive(Debug, Clone, PartialEq)]
pub enum NewBooking {
    Client {
        barber_id: i64,
        client_id: i64,
        service_id: i64,
        date: NaiveDate,
        time: NaiveTime,
        note: String,
    },
    /// Guest appointment or barber break; blocks time without a client or service.
    Break {
        barber_id: i64,
        date: NaiveDate,
        time: NaiveTime,
        duration_minutes: i64,
        reason: String,
    },
}

impl NewBooking {
    fn barber_id(&self) -> i64 {
        match self {
            NewBooking::Client { barber_id, .. } | NewBooking::Break { barber_id, .. } => {
                *barber_id
            }
        }
    }

    fn date(&self) -> NaiveDate {
        match self {
            NewBooking::Client { date, .. } | NewBooking::Break { date, .. } => *date,
        }
    }
}

/// Outcome of a reconciliation pass.
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    pub examined: usize,
    pub synced: usize,
    pub failed: usize,
}

#[derive(Clone)]
pub struct BookingService {
    store: Store,
    calendar: Option<SharedCalendar>,
    settings: Arc<BookingSettings>,
    locks: SlotLocks,
}

impl BookingService {
    /// `calendar` is `None` when mirroring is disabled; rows are then stored
    /// as `Unmirrored`.
    pub fn new(store: Store, calendar: Option<SharedCalendar>, settings: BookingSettings) -> Self {
        Self {
            store,
            calendar,
            settings: Arc::new(settings),
            locks: SlotLocks::new(),
        }
    }

    pub fn settings(&self) -> &BookingSettings {
        &self.settings
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub async fn available_slots(
        &self,
        barber_id: i64,
        service_id: i64,
        date: NaiveDate,
    ) -> Result<Vec<AvailableSlot>, BookingError> {
        let barber = self
            .store
            .barbers
            .find_by_id(barber_id)
            .await?
            .ok_or_else(|| BookingError::not_found(format!("Barber {barber_id}")))?;
        let service = self
            .store
            .services
            .find_by_id(service_id)
            .await?
            .ok_or_else(|| BookingError::not_found(format!("Service {service_id}")))?;

        let appointments = self
            .store
            .appointments
            .find_by_barber_and_date(barber_id, date)
            .await?;
        debug!(
            "Computing slots for barber {} on {} against {} appointments",
            barber_id,
            date,
            appointments.len()
        );

        let tz = self.settings.time_zone;
        Ok(calculate_available_slots(
            date,
            WorkingHours::new(barber.work_start_hour, barber.work_end_hour),
            Duration::minutes(service.duration_minutes),
            &booked_intervals(&appointments, &tz),
            self.settings.slot_interval,
            tz,
        ))
    }

    /// Store a booking or break, then mirror it into the calendar.
    ///
    /// A calendar failure is logged and recorded as `Failed`; the stored
    /// appointment is still returned.
    pub async fn book(&self, request: NewBooking) -> Result<Appointment, BookingError> {
        let barber_id = request.barber_id();
        if self.store.barbers.find_by_id(barber_id).await?.is_none() {
            return Err(BookingError::not_found(format!("Barber {barber_id}")));
        }

        let (time, duration_minutes, kind) = match request.clone() {
            NewBooking::Client {
                client_id,
                service_id,
                time,
                note,
                ..
            } => {
                if self.store.clients.find_by_id(client_id).await?.is_none() {
                    return Err(BookingError::not_found(format!("Client {client_id}")));
                }
                let service = self
                    .store
                    .services
                    .find_by_id(service_id)
                    .await?
                    .ok_or_else(|| BookingError::not_found(format!("Service {service_id}")))?;
                (
                    time,
                    service.duration_minutes,
                    AppointmentKind::Booking {
                        client_id,
                        service_id,
                        note,
                    },
                )
            }
            NewBooking::Break {
                time,
                duration_minutes,
                reason,
                ..
            } => {
                if duration_minutes <= 0 {
                    return Err(BookingError::Validation(
                        "duration must be positive".to_string(),
                    ));
                }
                (
                    time,
                    duration_minutes,
                    AppointmentKind::Break {
                        reason: self.break_reason(reason),
                    },
                )
            }
        };

        let date = request.date();
        self.ensure_exists(date, time)?;
        let new_row = NewAppointment {
            date,
            time,
            duration_minutes,
            barber_id,
            kind,
            sync_status: self.initial_status(),
        };

        let appointment = {
            let _guard = if self.settings.enforce_no_overlap {
                Some(self.locks.acquire(barber_id, date).await)
            } else {
                None
            };
            if self.settings.enforce_no_overlap && !new_row.kind.is_break() {
                self.ensure_free(barber_id, date, time, duration_minutes, None)
                    .await?;
            }
            self.store.appointments.insert(new_row).await?
        };

        info!(
            "Booked appointment {} for barber {} on {} at {} ({} min)",
            appointment.id, barber_id, date, time, duration_minutes
        );
        self.mirror(appointment).await
    }

    /// Block `[start, end)` on one day.
    pub async fn book_break(
        &self,
        barber_id: i64,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
        reason: Option<String>,
    ) -> Result<Appointment, BookingError> {
        if end <= start {
            return Err(BookingError::Validation(
                "break must end after it starts".to_string(),
            ));
        }
        self.book(NewBooking::Break {
            barber_id,
            date,
            time: start,
            duration_minutes: (end - start).num_minutes(),
            reason: reason.unwrap_or_default(),
        })
        .await
    }

    /// One full-day break per calendar day in `[from, to]`, each covering the
    /// barber's working window.
    pub async fn book_break_range(
        &self,
        barber_id: i64,
        from: NaiveDate,
        to: NaiveDate,
        reason: Option<String>,
    ) -> Result<Vec<Appointment>, BookingError> {
        if to < from {
            return Err(BookingError::Validation(
                "range end must not be before its start".to_string(),
            ));
        }
        let days = days_in_range(from, to);
        if days.len() as i64 > self.settings.max_break_days {
            return Err(BookingError::Validation(format!(
                "break ranges are limited to {} days",
                self.settings.max_break_days
            )));
        }

        let barber = self
            .store
            .barbers
            .find_by_id(barber_id)
            .await?
            .ok_or_else(|| BookingError::not_found(format!("Barber {barber_id}")))?;
        let hours = WorkingHours::new(barber.work_start_hour, barber.work_end_hour);
        let opening = hours
            .opening()
            .ok_or_else(|| BookingError::Validation("invalid working hours".to_string()))?;
        let duration_minutes = hours.length().num_minutes();
        if duration_minutes <= 0 {
            return Err(BookingError::Validation(
                "barber has an empty working window".to_string(),
            ));
        }

        let reason = reason.unwrap_or_default();
        let mut created = Vec::with_capacity(days.len());
        for date in days {
            created.push(
                self.book(NewBooking::Break {
                    barber_id,
                    date,
                    time: opening,
                    duration_minutes,
                    reason: reason.clone(),
                })
                .await?,
            );
        }
        info!(
            "Blocked {} days for barber {} from {} to {}",
            created.len(),
            barber_id,
            from,
            to
        );
        Ok(created)
    }

    /// Cancel an appointment.
    ///
    /// Mirrored rows are removed from the calendar first; when the matching
    /// event cannot be identified the cancellation fails and the row stays.
    /// Rows that were never mirrored are deleted locally.
    pub async fn cancel(&self, id: i64) -> Result<(), BookingError> {
        let appointment = self.get_appointment(id).await?;

        match (&self.calendar, appointment.sync_status) {
            (Some(calendar), SyncStatus::Synced) => {
                let calendar_id = self
                    .calendar_id_for(appointment.barber_id)
                    .await?
                    .ok_or_else(|| BookingError::Config("no calendar configured".to_string()))?;
                let event = self.find_mirror(calendar, &calendar_id, &appointment).await?;
                calendar
                    .delete_event(&calendar_id, &event.event_id)
                    .await
                    .map_err(|e| {
                        error!("Failed to delete calendar event {}: {}", event.event_id, e);
                        BookingError::Calendar(e.to_string())
                    })?;
                debug!("Deleted calendar event {} for appointment {}", event.event_id, id);
            }
            (None, SyncStatus::Synced) => {
                warn!(
                    "Calendar disabled; appointment {} keeps its remote event",
                    id
                );
            }
            _ => debug!("Appointment {} was never mirrored", id),
        }
        if let (Some(calendar), Some(stale)) = (&self.calendar, &appointment.stale_event) {
            if let Err(e) = calendar.delete_event(&stale.calendar_id, &stale.event_id).await {
                warn!("Calendar event {} left behind: {}", stale.event_id, e);
            }
        }

        if !self.store.appointments.delete(id).await? {
            return Err(BookingError::not_found(format!("Appointment {id}")));
        }
        info!("Cancelled appointment {}", id);
        Ok(())
    }

    /// Replace date, time, note, duration, barber and (for bookings) client.
    ///
    /// A mirrored appointment has its old event removed and a new one created.
    pub async fn reschedule(
        &self,
        id: i64,
        update: AppointmentUpdate,
    ) -> Result<Appointment, BookingError> {
        if update.duration_minutes <= 0 {
            return Err(BookingError::Validation(
                "duration must be positive".to_string(),
            ));
        }
        let old = self.get_appointment(id).await?;
        if self.store.barbers.find_by_id(update.barber_id).await?.is_none() {
            return Err(BookingError::not_found(format!("Barber {}", update.barber_id)));
        }

        let kind = match &old.kind {
            AppointmentKind::Booking {
                client_id,
                service_id,
                ..
            } => {
                let client_id = update.client_id.unwrap_or(*client_id);
                if self.store.clients.find_by_id(client_id).await?.is_none() {
                    return Err(BookingError::not_found(format!("Client {client_id}")));
                }
                AppointmentKind::Booking {
                    client_id,
                    service_id: *service_id,
                    note: update.note.clone(),
                }
            }
            AppointmentKind::Break { .. } => {
                if update.client_id.is_some() {
                    return Err(BookingError::Validation(
                        "breaks cannot be assigned to a client".to_string(),
                    ));
                }
                AppointmentKind::Break {
                    reason: self.break_reason(update.note.clone()),
                }
            }
        };
        self.ensure_exists(update.date, update.time)?;

        let mut updated = Appointment {
            date: update.date,
            time: update.time,
            duration_minutes: update.duration_minutes,
            barber_id: update.barber_id,
            kind,
            ..old.clone()
        };

        {
            let _guard = if self.settings.enforce_no_overlap {
                Some(self.locks.acquire(updated.barber_id, updated.date).await)
            } else {
                None
            };
            if self.settings.enforce_no_overlap && !updated.kind.is_break() {
                self.ensure_free(
                    updated.barber_id,
                    updated.date,
                    updated.time,
                    updated.duration_minutes,
                    Some(id),
                )
                .await?;
            }
            if !self.store.appointments.update(&updated).await? {
                return Err(BookingError::not_found(format!("Appointment {id}")));
            }
        }
        info!("Rescheduled appointment {} to {} {}", id, updated.date, updated.time);

        let Some(calendar) = &self.calendar else {
            return Ok(updated);
        };
        if old.sync_status == SyncStatus::Unmirrored {
            return Ok(updated);
        }

        if old.sync_status == SyncStatus::Synced {
            if let Err(e) = self.remove_mirror(calendar, &old).await {
                error!("Could not remove old event of appointment {}: {}", id, e);
                let stale = self.stale_event_of(&old).await;
                match &stale {
                    Some(stale) => {
                        self.store
                            .appointments
                            .set_stale_event(id, Some(stale))
                            .await?;
                    }
                    None => warn!("Old event of appointment {} cannot be tracked", id),
                }
                self.store
                    .appointments
                    .set_sync_status(id, SyncStatus::Failed, None)
                    .await?;
                updated.sync_status = SyncStatus::Failed;
                updated.calendar_event_id = None;
                updated.stale_event = stale;
                return Ok(updated);
            }
        }
        self.mirror(updated).await
    }

    /// Delete the most recently created appointment.
    ///
    /// Its calendar event is removed when one was recorded; a failure there
    /// is only logged.
    pub async fn undo_last(&self) -> Result<Appointment, BookingError> {
        let removed = self
            .store
            .appointments
            .delete_latest()
            .await?
            .ok_or_else(|| BookingError::not_found("Appointment"))?;
        info!("Removed latest appointment {}", removed.id);

        let recorded = removed.calendar_event_id.as_deref();
        if let (Some(calendar), Some(event_id)) = (&self.calendar, recorded) {
            match self.calendar_id_for(removed.barber_id).await {
                Ok(Some(calendar_id)) => {
                    if let Err(e) = calendar.delete_event(&calendar_id, event_id).await {
                        warn!("Calendar event {} left behind: {}", event_id, e);
                    }
                }
                Ok(None) => warn!("No calendar for barber {}", removed.barber_id),
                Err(e) => warn!("Calendar event {} left behind: {}", event_id, e),
            }
        }
        if let (Some(calendar), Some(stale)) = (&self.calendar, &removed.stale_event) {
            if let Err(e) = calendar.delete_event(&stale.calendar_id, &stale.event_id).await {
                warn!("Calendar event {} left behind: {}", stale.event_id, e);
            }
        }
        Ok(removed)
    }

    /// Retry the mirror of every `Failed` row and of `Pending` rows older
    /// than the grace period.
    ///
    /// An event left behind by a failed move is deleted before the row is
    /// mirrored again; while that deletion fails the row stays `Failed`.
    pub async fn reconcile(&self) -> Result<ReconcileReport, BookingError> {
        let mut report = ReconcileReport::default();
        let Some(calendar) = &self.calendar else {
            return Ok(report);
        };

        let cutoff = Utc::now() - self.settings.reconcile_grace;
        for mut appointment in self.store.appointments.find_unsynced(cutoff).await? {
            report.examined += 1;
            let id = appointment.id;
            if let Some(stale) = appointment.stale_event.take() {
                if let Err(e) = self.drop_stale_event(calendar, id, &stale).await {
                    error!("Stale event {} of appointment {} remains: {}", stale.event_id, id, e);
                    report.failed += 1;
                    continue;
                }
            }
            match self.mirror(appointment).await {
                Ok(a) if a.sync_status == SyncStatus::Synced => report.synced += 1,
                Ok(_) => report.failed += 1,
                Err(e) => {
                    error!("Reconciliation of appointment {} failed: {}", id, e);
                    report.failed += 1;
                }
            }
        }
        if report.examined > 0 {
            info!(
                "Reconciled {} appointments: {} synced, {} failed",
                report.examined, report.synced, report.failed
            );
        }
        Ok(report)
    }

    /// Run [`reconcile`](Self::reconcile) on a fixed interval.
    pub fn spawn_reconciler(self, every: StdDuration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if let Err(e) = self.reconcile().await {
                    error!("Reconciliation pass failed: {}", e);
                }
            }
        })
    }

    pub async fn list_appointments(&self) -> Result<Vec<Appointment>, BookingError> {
        Ok(self.store.appointments.find_all().await?)
    }

    pub async fn get_appointment(&self, id: i64) -> Result<Appointment, BookingError> {
        self.store
            .appointments
            .find_by_id(id)
            .await?
            .ok_or_else(|| BookingError::not_found(format!("Appointment {id}")))
    }

    pub async fn details_for_barber(
        &self,
        barber_id: i64,
    ) -> Result<Vec<BarberAppointmentDetail>, BookingError> {
        Ok(self.store.appointments.details_for_barber(barber_id).await?)
    }

    pub async fn details_for_client(
        &self,
        client_id: i64,
    ) -> Result<Vec<ClientAppointmentDetail>, BookingError> {
        Ok(self.store.appointments.details_for_client(client_id).await?)
    }

    fn initial_status(&self) -> SyncStatus {
        match self.calendar {
            Some(_) => SyncStatus::Pending,
            None => SyncStatus::Unmirrored,
        }
    }

    fn break_reason(&self, reason: String) -> String {
        if reason.trim().is_empty() {
            self.settings.break_note.clone()
        } else {
            reason
        }
    }

    /// Fails with `SlotTaken` when `[time, time + duration)` overlaps another
    /// appointment of the barber on that date. Must run under the day's lock.
    async fn ensure_free(
        &self,
        barber_id: i64,
        date: NaiveDate,
        time: NaiveTime,
        duration_minutes: i64,
        ignore_id: Option<i64>,
    ) -> Result<(), BookingError> {
        let tz = self.settings.time_zone;
        let start = resolve_local(&tz, date, time).ok_or_else(|| {
            BookingError::Validation(format!("{date} {time} does not exist in {tz}"))
        })?;
        let end = start + Duration::minutes(duration_minutes);

        let mut existing = self
            .store
            .appointments
            .find_by_barber_and_date(barber_id, date)
            .await?;
        existing.retain(|a| Some(a.id) != ignore_id);

        if is_free(start, end, &booked_intervals(&existing, &tz)) {
            Ok(())
        } else {
            warn!(
                "Rejected overlapping booking for barber {} on {} at {}",
                barber_id, date, time
            );
            Err(BookingError::SlotTaken)
        }
    }

    async fn calendar_id_for(&self, barber_id: i64) -> Result<Option<String>, BookingError> {
        let own = self
            .store
            .barbers
            .find_by_id(barber_id)
            .await?
            .and_then(|barber| barber.calendar_id)
            .filter(|id| !id.is_empty());
        Ok(own.or_else(|| self.settings.default_calendar_id.clone()))
    }

    /// Rejects wall-clock times skipped by a DST change.
    fn ensure_exists(&self, date: NaiveDate, time: NaiveTime) -> Result<(), BookingError> {
        let tz = self.settings.time_zone;
        match resolve_local(&tz, date, time) {
            Some(_) => Ok(()),
            None => Err(BookingError::Validation(format!(
                "{date} {time} does not exist in {tz}"
            ))),
        }
    }

    fn event_window(&self, appointment: &Appointment) -> (DateTime<Tz>, DateTime<Tz>) {
        appointment_interval(appointment, &self.settings.time_zone)
    }

    /// The event a mirrored row points at, for tracking after a failed removal.
    async fn stale_event_of(&self, appointment: &Appointment) -> Option<StaleEvent> {
        let event_id = appointment.calendar_event_id.clone()?;
        match self.calendar_id_for(appointment.barber_id).await {
            Ok(Some(calendar_id)) => Some(StaleEvent {
                calendar_id,
                event_id,
            }),
            Ok(None) => None,
            Err(e) => {
                warn!("No calendar for barber {}: {}", appointment.barber_id, e);
                None
            }
        }
    }

    async fn drop_stale_event(
        &self,
        calendar: &SharedCalendar,
        id: i64,
        stale: &StaleEvent,
    ) -> Result<(), BookingError> {
        calendar
            .delete_event(&stale.calendar_id, &stale.event_id)
            .await
            .map_err(|e| BookingError::Calendar(e.to_string()))?;
        self.store.appointments.set_stale_event(id, None).await?;
        debug!("Deleted stale event {} of appointment {}", stale.event_id, id);
        Ok(())
    }

    /// Calendar event text for an appointment.
    async fn event_for(&self, appointment: &Appointment) -> Result<CalendarEvent, BookingError> {
        let (start, end) = self.event_window(appointment);
        let (summary, description) = match &appointment.kind {
            AppointmentKind::Booking {
                client_id,
                service_id,
                note,
            } => {
                let client = self
                    .store
                    .clients
                    .find_by_id(*client_id)
                    .await?
                    .ok_or_else(|| BookingError::not_found(format!("Client {client_id}")))?;
                let service = self
                    .store
                    .services
                    .find_by_id(*service_id)
                    .await?
                    .ok_or_else(|| BookingError::not_found(format!("Service {service_id}")))?;
                let summary = format!("{} {}", client.name, client.surname);
                let mut description =
                    format!("{summary} - {} Phone: {}", service.name, client.phone);
                if !note.trim().is_empty() {
                    description.push_str(&format!("\n{note}"));
                }
                (summary, description)
            }
            AppointmentKind::Break { reason } => (reason.clone(), reason.clone()),
        };

        Ok(CalendarEvent {
            summary,
            description: Some(description),
            start_time: start.to_rfc3339(),
            end_time: end.to_rfc3339(),
            time_zone: self.settings.time_zone.name().to_string(),
        })
    }

    /// Insert the calendar event for a stored row and record the outcome.
    async fn mirror(&self, mut appointment: Appointment) -> Result<Appointment, BookingError> {
        let Some(calendar) = &self.calendar else {
            return Ok(appointment);
        };

        let outcome: Result<CalendarEventResult, BookingError> = async {
            let calendar_id = self
                .calendar_id_for(appointment.barber_id)
                .await?
                .ok_or_else(|| BookingError::Config("no calendar configured".to_string()))?;
            let event = self.event_for(&appointment).await?;
            calendar
                .insert_event(&calendar_id, event)
                .await
                .map_err(|e| BookingError::Calendar(e.to_string()))
        }
        .await;

        let (status, event_id) = match outcome {
            Ok(result) => {
                debug!(
                    "Mirrored appointment {} as event {:?}",
                    appointment.id, result.event_id
                );
                (SyncStatus::Synced, result.event_id)
            }
            Err(e) => {
                error!(
                    "Calendar mirror failed for appointment {}: {}",
                    appointment.id, e
                );
                (SyncStatus::Failed, None)
            }
        };

        self.store
            .appointments
            .set_sync_status(appointment.id, status, event_id.as_deref())
            .await?;
        appointment.sync_status = status;
        appointment.calendar_event_id = event_id;
        Ok(appointment)
    }

    /// Locate the calendar event mirroring `appointment`.
    ///
    /// Events overlapping the appointment's window are listed with its note
    /// as text query. The recorded event id wins when present; otherwise
    /// exactly one candidate must remain.
    async fn find_mirror(
        &self,
        calendar: &SharedCalendar,
        calendar_id: &str,
        appointment: &Appointment,
    ) -> Result<BookedEvent, BookingError> {
        let (start, end) = self.event_window(appointment);
        let note = appointment.note().trim();
        let query = (!note.is_empty()).then_some(note);

        let mut events = calendar
            .list_events(
                calendar_id,
                start.with_timezone(&Utc),
                end.with_timezone(&Utc),
                query,
            )
            .await
            .map_err(|e| {
                error!("Calendar lookup for appointment {} failed: {}", appointment.id, e);
                BookingError::Calendar(e.to_string())
            })?;
        debug!(
            "Calendar lookup for appointment {} matched {} events",
            appointment.id,
            events.len()
        );

        if let Some(recorded) = appointment.calendar_event_id.as_deref() {
            if let Some(pos) = events.iter().position(|e| e.event_id == recorded) {
                return Ok(events.swap_remove(pos));
            }
        }
        match events.len() {
            0 => Err(BookingError::MirrorMissing(appointment.id)),
            1 => Ok(events.remove(0)),
            n => Err(BookingError::MirrorAmbiguous(appointment.id, n)),
        }
    }

    /// Delete the event mirroring `appointment`; a missing event counts as removed.
    async fn remove_mirror(
        &self,
        calendar: &SharedCalendar,
        appointment: &Appointment,
    ) -> Result<(), BookingError> {
        let calendar_id = self
            .calendar_id_for(appointment.barber_id)
            .await?
            .ok_or_else(|| BookingError::Config("no calendar configured".to_string()))?;
        let event = match self.find_mirror(calendar, &calendar_id, appointment).await {
            Ok(event) => event,
            Err(BookingError::MirrorMissing(id)) => {
                warn!("Old event of appointment {} already gone", id);
                return Ok(());
            }
            Err(e) => return Err(e),
        };
        calendar
            .delete_event(&calendar_id, &event.event_id)
            .await
            .map_err(|e| BookingError::Calendar(e.to_string()))
    }
}
