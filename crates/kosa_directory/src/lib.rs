// --- File: crates/kosa_directory/src/lib.rs ---
// Declare modules within this crate
pub mod doc;
pub mod error;
pub mod handlers;
pub mod logic;
pub mod routes;

pub use error::DirectoryError;
pub use handlers::DirectoryState;
