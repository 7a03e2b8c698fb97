// --- File: crates/kosa_auth/src/lib.rs ---
// Declare modules within this crate
pub mod cookie;
pub mod doc;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod password;
pub mod routes;
pub mod token;

pub use error::AuthError;
pub use extract::{AuthUser, BarberUser};
pub use handlers::AuthState;
pub use password::{hash_password, verify_password};
pub use token::{Principal, TokenIssuer};
