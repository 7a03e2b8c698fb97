//! Google Calendar implementation of [`CalendarService`].

use chrono::{DateTime, Utc};
use google_calendar3::api::{Event, EventDateTime, EventReminder, EventReminders};
use kosa_common::services::{
    BoxFuture, BookedEvent, CalendarEvent, CalendarEventResult, CalendarService,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::auth::HubType;

/// Email reminder one day ahead.
pub const EMAIL_REMINDER_MINUTES: i32 = 24 * 60;
/// Popup reminder shortly before the appointment.
pub const POPUP_REMINDER_MINUTES: i32 = 10;

/// Errors that can occur when interacting with Google Calendar.
#[derive(Error, Debug)]
pub enum GcalServiceError {
    #[error("Google API Error: {0}")]
    ApiError(#[from] google_calendar3::Error),
    #[error("Failed to parse time: {0}")]
    TimeParseError(String),
    #[error("Calculation error: {0}")]
    CalculationError(String),
    /// Failure injected by the in-memory calendar.
    #[error("Calendar unavailable: {0}")]
    Unavailable(String),
}

pub(crate) fn parse_instant(raw: &str, field: &str) -> Result<DateTime<Utc>, GcalServiceError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| GcalServiceError::TimeParseError(format!("Invalid {}: {}", field, e)))
}

/// HTTP status carried by an API error, from the raw response or the JSON error body.
fn error_status(error: &google_calendar3::Error) -> Option<u16> {
    match error {
        google_calendar3::Error::Failure(response) => Some(response.status().as_u16()),
        google_calendar3::Error::BadRequest(body) => body
            .pointer("/error/code")
            .and_then(|code| code.as_u64())
            .and_then(|code| u16::try_from(code).ok()),
        _ => None,
    }
}

/// 404 Not Found or 410 Gone: the event no longer exists.
pub(crate) fn is_gone(error: &google_calendar3::Error) -> bool {
    matches!(error_status(error), Some(404 | 410))
}

/// Checks the event's instants and returns them as UTC.
pub(crate) fn event_bounds(
    event: &CalendarEvent,
) -> Result<(DateTime<Utc>, DateTime<Utc>), GcalServiceError> {
    let start = parse_instant(&event.start_time, "start_time")?;
    let end = parse_instant(&event.end_time, "end_time")?;
    if end <= start {
        return Err(GcalServiceError::CalculationError(
            "End time must be after start time".to_string(),
        ));
    }
    Ok((start, end))
}

fn default_reminders() -> EventReminders {
    EventReminders {
        use_default: Some(false),
        overrides: Some(vec![
            EventReminder {
                method: Some("email".to_string()),
                minutes: Some(EMAIL_REMINDER_MINUTES),
            },
            EventReminder {
                method: Some("popup".to_string()),
                minutes: Some(POPUP_REMINDER_MINUTES),
            },
        ]),
    }
}

fn format_event_time(value: Option<EventDateTime>) -> String {
    match value {
        Some(EventDateTime {
            date_time: Some(dt),
            ..
        }) => dt.to_rfc3339(),
        Some(EventDateTime { date: Some(d), .. }) => format!("{}T00:00:00Z", d),
        _ => String::new(),
    }
}

/// Google Calendar service implementation.
pub struct GoogleCalendarService {
    calendar_hub: Arc<HubType>,
}

impl GoogleCalendarService {
    pub fn new(calendar_hub: Arc<HubType>) -> Self {
        Self { calendar_hub }
    }
}

impl CalendarService for GoogleCalendarService {
    type Error = GcalServiceError;

    /// Inserts the event with the shop's reminder policy. Instants are sent
    /// in UTC and tagged with the event's display zone.
    fn insert_event(
        &self,
        calendar_id: &str,
        event: CalendarEvent,
    ) -> BoxFuture<'_, CalendarEventResult, Self::Error> {
        let calendar_id = calendar_id.to_string();
        let calendar_hub = self.calendar_hub.clone();

        Box::pin(async move {
            let (start_dt, end_dt) = event_bounds(&event)?;

            let new_event = Event {
                summary: Some(event.summary),
                description: event.description,
                start: Some(EventDateTime {
                    date_time: Some(start_dt),
                    time_zone: Some(event.time_zone.clone()),
                    ..Default::default()
                }),
                end: Some(EventDateTime {
                    date_time: Some(end_dt),
                    time_zone: Some(event.time_zone),
                    ..Default::default()
                }),
                reminders: Some(default_reminders()),
                ..Default::default()
            };

            let (_response, created_event) = calendar_hub
                .events()
                .insert(new_event, &calendar_id)
                .doit()
                .await?;

            info!("Created calendar event {:?}", created_event.id);
            Ok(CalendarEventResult {
                event_id: created_event.id,
                status: created_event
                    .status
                    .unwrap_or_else(|| "confirmed".to_string()),
            })
        })
    }

    fn list_events(
        &self,
        calendar_id: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
        text_query: Option<&str>,
    ) -> BoxFuture<'_, Vec<BookedEvent>, Self::Error> {
        let calendar_id = calendar_id.to_string();
        let text_query = text_query.map(str::to_string);
        let calendar_hub = self.calendar_hub.clone();

        Box::pin(async move {
            let mut request = calendar_hub
                .events()
                .list(&calendar_id)
                .time_min(time_min)
                .time_max(time_max)
                .single_events(true)
                .order_by("startTime");
            if let Some(q) = text_query.as_deref() {
                request = request.q(q);
            }

            let (_, events_list) = request.doit().await?;

            let booked: Vec<BookedEvent> = events_list
                .items
                .unwrap_or_default()
                .into_iter()
                .filter(|event| event.status.as_deref() != Some("cancelled"))
                .map(|event| BookedEvent {
                    event_id: event.id.unwrap_or_default(),
                    summary: event.summary.unwrap_or_default(),
                    description: event.description,
                    start_time: format_event_time(event.start),
                    end_time: format_event_time(event.end),
                    status: event.status.unwrap_or_else(|| "confirmed".to_string()),
                })
                .collect();

            debug!("Listed {} calendar events", booked.len());
            Ok(booked)
        })
    }

    /// Deletes the event. An event that is already gone counts as deleted.
    fn delete_event(&self, calendar_id: &str, event_id: &str) -> BoxFuture<'_, (), Self::Error> {
        let calendar_id = calendar_id.to_string();
        let event_id = event_id.to_string();
        let calendar_hub = self.calendar_hub.clone();

        Box::pin(async move {
            match calendar_hub
                .events()
                .delete(&calendar_id, &event_id)
                .doit()
                .await
            {
                Ok(_) => Ok(()),
                Err(e) if is_gone(&e) => {
                    warn!("Calendar event {} was already gone", event_id);
                    Ok(())
                }
                Err(e) => Err(GcalServiceError::ApiError(e)),
            }
        })
    }
}
