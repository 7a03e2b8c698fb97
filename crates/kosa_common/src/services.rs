//! Service abstractions for external collaborators.
//!
//! The booking core only sees the [`CalendarService`] trait, so the Google
//! implementation and the in-memory double are interchangeable and the
//! concrete client is built once at startup and injected.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// A wrapper error type that implements std::error::Error for Box<dyn std::error::Error + Send + Sync>
#[derive(Debug)]
pub struct BoxedError(pub Box<dyn StdError + Send + Sync>);

impl fmt::Display for BoxedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl StdError for BoxedError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.0.source()
    }
}

impl From<Box<dyn StdError + Send + Sync>> for BoxedError {
    fn from(err: Box<dyn StdError + Send + Sync>) -> Self {
        BoxedError(err)
    }
}

/// Calendar operations the booking core depends on.
pub trait CalendarService: Send + Sync {
    /// Error type returned by calendar service operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Create an event; the returned id is what `delete_event` expects.
    fn insert_event(
        &self,
        calendar_id: &str,
        event: CalendarEvent,
    ) -> BoxFuture<'_, CalendarEventResult, Self::Error>;

    /// Events overlapping `[time_min, time_max]`, optionally narrowed by a
    /// free-text query matched against summary and description.
    fn list_events(
        &self,
        calendar_id: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
        text_query: Option<&str>,
    ) -> BoxFuture<'_, Vec<BookedEvent>, Self::Error>;

    /// Delete an event by id.
    fn delete_event(&self, calendar_id: &str, event_id: &str) -> BoxFuture<'_, (), Self::Error>;
}

impl<S: CalendarService + ?Sized> CalendarService for Arc<S> {
    type Error = S::Error;

    fn insert_event(
        &self,
        calendar_id: &str,
        event: CalendarEvent,
    ) -> BoxFuture<'_, CalendarEventResult, Self::Error> {
        (**self).insert_event(calendar_id, event)
    }

    fn list_events(
        &self,
        calendar_id: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
        text_query: Option<&str>,
    ) -> BoxFuture<'_, Vec<BookedEvent>, Self::Error> {
        (**self).list_events(calendar_id, time_min, time_max, text_query)
    }

    fn delete_event(&self, calendar_id: &str, event_id: &str) -> BoxFuture<'_, (), Self::Error> {
        (**self).delete_event(calendar_id, event_id)
    }
}

/// Shared handle to a calendar whose errors have been boxed.
pub type SharedCalendar = Arc<dyn CalendarService<Error = BoxedError>>;

/// Adapter erasing a concrete calendar's error type.
pub struct BoxedCalendarService<S> {
    inner: S,
}

impl<S> BoxedCalendarService<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

impl<S: CalendarService> CalendarService for BoxedCalendarService<S> {
    type Error = BoxedError;

    fn insert_event(
        &self,
        calendar_id: &str,
        event: CalendarEvent,
    ) -> BoxFuture<'_, CalendarEventResult, Self::Error> {
        let fut = self.inner.insert_event(calendar_id, event);
        Box::pin(async move { fut.await.map_err(|e| BoxedError(Box::new(e))) })
    }

    fn list_events(
        &self,
        calendar_id: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
        text_query: Option<&str>,
    ) -> BoxFuture<'_, Vec<BookedEvent>, Self::Error> {
        let fut = self
            .inner
            .list_events(calendar_id, time_min, time_max, text_query);
        Box::pin(async move { fut.await.map_err(|e| BoxedError(Box::new(e))) })
    }

    fn delete_event(&self, calendar_id: &str, event_id: &str) -> BoxFuture<'_, (), Self::Error> {
        let fut = self.inner.delete_event(calendar_id, event_id);
        Box::pin(async move { fut.await.map_err(|e| BoxedError(Box::new(e))) })
    }
}

/// Box a concrete calendar behind the shared trait object.
pub fn boxed<S>(service: S) -> SharedCalendar
where
    S: CalendarService + 'static,
{
    Arc::new(BoxedCalendarService::new(service))
}

/// Event to create in the external calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub summary: String,
    pub description: Option<String>,
    /// RFC 3339 start instant.
    pub start_time: String,
    /// RFC 3339 end instant.
    pub end_time: String,
    /// IANA zone the event is displayed in.
    pub time_zone: String,
}

/// Represents the result of a calendar event operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarEventResult {
    pub event_id: Option<String>,
    pub status: String,
}

/// An event read back from the calendar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookedEvent {
    pub event_id: String,
    pub summary: String,
    pub description: Option<String>,
    pub start_time: String,
    pub end_time: String,
    pub status: String,
}
