//! In-memory calendar for tests.
//!
//! Behaves like the Google implementation for the operations the booking
//! core uses, and can be told to fail so mirror-failure paths are testable.

use crate::service::{event_bounds, GcalServiceError};
use chrono::{DateTime, Utc};
use kosa_common::services::{
    BoxFuture, BookedEvent, CalendarEvent, CalendarEventResult, CalendarService,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone)]
struct StoredEvent {
    id: String,
    event: CalendarEvent,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl StoredEvent {
    fn to_booked(&self) -> BookedEvent {
        BookedEvent {
            event_id: self.id.clone(),
            summary: self.event.summary.clone(),
            description: self.event.description.clone(),
            start_time: self.event.start_time.clone(),
            end_time: self.event.end_time.clone(),
            status: "confirmed".to_string(),
        }
    }

    fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.event.summary.to_lowercase().contains(&query)
            || self
                .event
                .description
                .as_deref()
                .map(|d| d.to_lowercase().contains(&query))
                .unwrap_or(false)
    }
}

/// Mock calendar service for testing.
#[derive(Default)]
pub struct MockCalendarService {
    events: Mutex<HashMap<String, Vec<StoredEvent>>>,
    fail_inserts: AtomicBool,
    fail_lists: AtomicBool,
    fail_deletes: AtomicBool,
    inserts: AtomicUsize,
    deletes: AtomicUsize,
}

impl MockCalendarService {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<StoredEvent>>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    pub fn fail_lists(&self, fail: bool) {
        self.fail_lists.store(fail, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    /// Successful inserts so far.
    pub fn insert_count(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }

    /// Successful deletes so far.
    pub fn delete_count(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    /// Everything currently stored in a calendar.
    pub fn events(&self, calendar_id: &str) -> Vec<BookedEvent> {
        self.lock()
            .get(calendar_id)
            .map(|events| events.iter().map(StoredEvent::to_booked).collect())
            .unwrap_or_default()
    }

    /// Drops an event behind the booking core's back, as if someone deleted
    /// it by hand in the calendar UI.
    pub fn remove_event(&self, calendar_id: &str, event_id: &str) -> bool {
        let mut events = self.lock();
        match events.get_mut(calendar_id) {
            Some(list) => {
                let before = list.len();
                list.retain(|e| e.id != event_id);
                list.len() != before
            }
            None => false,
        }
    }

    fn store(&self, calendar_id: &str, event: CalendarEvent) -> Result<String, GcalServiceError> {
        let (start, end) = event_bounds(&event)?;
        let id = uuid::Uuid::new_v4().simple().to_string();
        self.lock()
            .entry(calendar_id.to_string())
            .or_default()
            .push(StoredEvent {
                id: id.clone(),
                event,
                start,
                end,
            });
        Ok(id)
    }

    /// Adds an event without counting it as an insert by the booking core.
    pub fn seed_event(
        &self,
        calendar_id: &str,
        event: CalendarEvent,
    ) -> Result<String, GcalServiceError> {
        self.store(calendar_id, event)
    }
}

impl CalendarService for MockCalendarService {
    type Error = GcalServiceError;

    fn insert_event(
        &self,
        calendar_id: &str,
        event: CalendarEvent,
    ) -> BoxFuture<'_, CalendarEventResult, Self::Error> {
        let calendar_id = calendar_id.to_string();

        Box::pin(async move {
            if self.fail_inserts.load(Ordering::SeqCst) {
                return Err(GcalServiceError::Unavailable("insert rejected".to_string()));
            }
            let id = self.store(&calendar_id, event)?;
            self.inserts.fetch_add(1, Ordering::SeqCst);
            Ok(CalendarEventResult {
                event_id: Some(id),
                status: "confirmed".to_string(),
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

        Box::pin(async move {
            if self.fail_lists.load(Ordering::SeqCst) {
                return Err(GcalServiceError::Unavailable("list rejected".to_string()));
            }
            let events = self.lock();
            let mut found: Vec<&StoredEvent> = events
                .get(&calendar_id)
                .map(|list| {
                    list.iter()
                        .filter(|e| e.start < time_max && e.end > time_min)
                        .filter(|e| text_query.as_deref().map_or(true, |q| e.matches(q)))
                        .collect()
                })
                .unwrap_or_default();
            found.sort_by_key(|e| e.start);
            Ok(found.into_iter().map(StoredEvent::to_booked).collect())
        })
    }

    fn delete_event(&self, calendar_id: &str, event_id: &str) -> BoxFuture<'_, (), Self::Error> {
        let calendar_id = calendar_id.to_string();
        let event_id = event_id.to_string();

        Box::pin(async move {
            if self.fail_deletes.load(Ordering::SeqCst) {
                return Err(GcalServiceError::Unavailable("delete rejected".to_string()));
            }
            if self.remove_event(&calendar_id, &event_id) {
                self.deletes.fetch_add(1, Ordering::SeqCst);
            }
            // Deleting a missing event succeeds, as with the live API.
            Ok(())
        })
    }
}
