// Declare modules within this crate
pub mod error; // Error handling
pub mod http; // HTTP error mapping
pub mod logging; // Logging utilities
pub mod models; // Domain models shared by all crates
pub mod services; // Service abstractions

// Re-export error types and utilities for easier access
pub use error::{
    auth_error, config_error, conflict, external_service_error, forbidden, internal_error,
    not_found, validation_error, HttpStatusCode, KosaError,
};

pub use logging::{init, init_with_level};
