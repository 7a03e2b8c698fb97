// File: crates/kosa_auth/src/doc.rs
#![cfg(feature = "openapi")]

use utoipa::OpenApi;

use crate::handlers::{
    BarberLoginRequest, ChangePasswordRequest, ClientLoginRequest, LoginResponse,
    MessageResponse, RegisterRequest,
};
use kosa_common::models::Client;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::register_handler,
        crate::handlers::login_handler,
        crate::handlers::barber_login_handler,
        crate::handlers::refresh_handler,
        crate::handlers::logout_handler,
        crate::handlers::change_password_handler
    ),
    components(
        schemas(
            RegisterRequest,
            ClientLoginRequest,
            BarberLoginRequest,
            LoginResponse,
            ChangePasswordRequest,
            MessageResponse,
            Client
        )
    ),
    tags(
        (name = "Auth", description = "Registration, login and session renewal")
    ),
    servers(
        (url = "/api", description = "Kosa API server")
    )
)]
pub struct AuthApiDoc;
