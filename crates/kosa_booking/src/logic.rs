// --- File: crates/kosa_booking/src/logic.rs ---
//! Slot computation.
//!
//! Everything here is a pure function of its inputs: no storage, no clock.
//! Wall-clock times are resolved in the shop's time zone and compared as
//! absolute instants, so appointments spanning a DST change keep their real
//! length.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;
use kosa_common::models::Appointment;
use serde::Serialize;
use std::str::FromStr;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// A barber's working window in whole hours, `[start_hour, end_hour)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkingHours {
    pub start_hour: u32,
    pub end_hour: u32,
}

impl WorkingHours {
    pub fn new(start_hour: u32, end_hour: u32) -> Self {
        Self {
            start_hour,
            end_hour,
        }
    }

    pub fn opening(&self) -> Option<NaiveTime> {
        NaiveTime::from_hms_opt(self.start_hour, 0, 0)
    }

    /// Length of the working window; zero when the bounds are inverted.
    pub fn length(&self) -> Duration {
        Duration::hours(i64::from(self.end_hour.saturating_sub(self.start_hour)))
    }
}

/// A bookable window for one service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvailableSlot {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

/// Wire shape of a slot: RFC 3339 instants carrying the shop's UTC offset.
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotResponse {
    #[cfg_attr(feature = "openapi", schema(example = "2024-01-10T09:00:00+01:00"))]
    pub start: String,
    #[cfg_attr(feature = "openapi", schema(example = "2024-01-10T09:30:00+01:00"))]
    pub end: String,
}

impl From<AvailableSlot> for SlotResponse {
    fn from(slot: AvailableSlot) -> Self {
        Self {
            start: slot.start.to_rfc3339(),
            end: slot.end.to_rfc3339(),
        }
    }
}

pub fn parse_time_zone(name: &str) -> Result<Tz, String> {
    Tz::from_str(name).map_err(|e| format!("unknown time zone {name}: {e}"))
}

/// Resolve a local wall-clock time to an instant.
///
/// Times inside a DST gap do not exist and yield `None`; times repeated by a
/// backward shift resolve to the earlier instant.
pub fn resolve_local(tz: &Tz, date: NaiveDate, time: NaiveTime) -> Option<DateTime<Tz>> {
    match tz.from_local_datetime(&date.and_time(time)) {
        LocalResult::Single(instant) => Some(instant),
        LocalResult::Ambiguous(earliest, _) => Some(earliest),
        LocalResult::None => None,
    }
}

/// Resolve a stored wall-clock time that must map to some instant.
///
/// A time inside a DST gap is read with the offset in force before the gap,
/// so 02:30 on a spring-forward night becomes 03:30 after the shift.
pub fn resolve_forward(tz: &Tz, date: NaiveDate, time: NaiveTime) -> DateTime<Tz> {
    let local = date.and_time(time);
    if let Some(instant) = resolve_local(tz, date, time) {
        return instant;
    }
    // Gaps never exceed a day; step back to the last wall-clock time before it.
    for minutes in 1..=24 * 60 {
        let back = Duration::minutes(minutes);
        let earlier = local - back;
        if let Some(instant) = resolve_local(tz, earlier.date(), earlier.time()) {
            return instant + back;
        }
    }
    tz.from_utc_datetime(&local)
}

/// `[start, end)` of a stored appointment in absolute time.
pub fn appointment_interval(appointment: &Appointment, tz: &Tz) -> (DateTime<Tz>, DateTime<Tz>) {
    let start = resolve_forward(tz, appointment.date, appointment.time);
    (start, start + Duration::minutes(appointment.duration_minutes))
}

pub fn booked_intervals(appointments: &[Appointment], tz: &Tz) -> Vec<(DateTime<Tz>, DateTime<Tz>)> {
    appointments
        .iter()
        .map(|a| appointment_interval(a, tz))
        .collect()
}

/// True when `[start, end)` fits entirely before or after every booked interval.
pub fn is_free(
    start: DateTime<Tz>,
    end: DateTime<Tz>,
    booked: &[(DateTime<Tz>, DateTime<Tz>)],
) -> bool {
    booked
        .iter()
        .all(|&(booked_start, booked_end)| end <= booked_start || start >= booked_end)
}

/// Compute the bookable slots for one day.
///
/// Candidates start at `start_hour:00` and advance by `step` while they are
/// before `end_hour:00`. A candidate is kept when `[start, start + duration)`
/// does not overlap any booked interval. The end of a slot is not clipped to
/// closing time, so a long service may run past `end_hour`.
pub fn calculate_available_slots(
    date: NaiveDate,
    hours: WorkingHours,
    service_duration: Duration,
    booked: &[(DateTime<Tz>, DateTime<Tz>)],
    step: Duration,
    tz: Tz,
) -> Vec<AvailableSlot> {
    let mut slots = Vec::new();
    if step <= Duration::zero() || service_duration <= Duration::zero() {
        return slots;
    }

    let first = i64::from(hours.start_hour) * 3600;
    let closing = i64::from(hours.end_hour.min(24)) * 3600;
    let step_secs = step.num_seconds();

    let mut offset = first;
    while offset < closing {
        let candidate = u32::try_from(offset)
            .ok()
            .and_then(|secs| NaiveTime::from_num_seconds_from_midnight_opt(secs, 0));
        offset += step_secs;

        let Some(local) = candidate else { continue };
        let Some(start) = resolve_local(&tz, date, local) else {
            continue;
        };
        let end = start + service_duration;
        if is_free(start, end, booked) {
            slots.push(AvailableSlot { start, end });
        }
    }
    slots
}

/// Every calendar day in `[from, to]`.
pub fn days_in_range(from: NaiveDate, to: NaiveDate) -> Vec<NaiveDate> {
    from.iter_days().take_while(|day| *day <= to).collect()
}
