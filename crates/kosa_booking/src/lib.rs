// --- File: crates/kosa_booking/src/lib.rs ---
// Declare modules within this crate
pub mod booking;
pub mod doc;
pub mod error;
pub mod handlers;
pub mod locks;
pub mod logic;
#[cfg(test)]
mod logic_proptest;
pub mod policy;
pub mod routes;

pub use booking::{BookingService, BookingSettings, NewBooking, ReconcileReport};
pub use error::BookingError;
pub use handlers::BookingState;
