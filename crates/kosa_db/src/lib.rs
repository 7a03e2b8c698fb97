//! Storage for the Kosa booking backend.
//!
//! Built on SQLx's `Any` driver so the same repositories run against SQLite
//! (the default) or PostgreSQL/MySQL behind feature flags.
//!
//! ```rust,no_run
//! use kosa_db::Store;
//!
//! async fn setup() -> Result<Store, kosa_db::DbError> {
//!     Store::connect("sqlite::memory:").await
//! }
//! ```

pub mod client;
pub mod error;
pub mod repositories;
pub mod store;

pub use client::DbClient;
pub use error::DbError;
pub use repositories::{
    AppointmentRepository, BarberRepository, ClientRepository, ServiceRepository,
    SqlAppointmentRepository, SqlBarberRepository, SqlClientRepository, SqlServiceRepository,
};
pub use store::Store;
