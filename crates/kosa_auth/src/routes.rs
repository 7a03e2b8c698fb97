// --- File: crates/kosa_auth/src/routes.rs ---

use axum::{
    routing::{post, put},
    Router,
};

use crate::handlers::{
    barber_login_handler, change_password_handler, login_handler, logout_handler,
    refresh_handler, register_handler, AuthState,
};

/// Session routes, mounted under `/api`.
pub fn routes(state: AuthState) -> Router {
    Router::new()
        .route("/register", post(register_handler))
        .route("/login", post(login_handler))
        .route("/barberlogin", post(barber_login_handler))
        .route("/refresh", post(refresh_handler))
        .route("/logout", post(logout_handler))
        .route("/change-password", put(change_password_handler))
        .with_state(state)
}
