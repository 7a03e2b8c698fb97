// Declare modules within this crate
pub mod auth;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod service;

pub use service::{GcalServiceError, GoogleCalendarService};
#[cfg(any(test, feature = "mock"))]
pub use mock::MockCalendarService;
