// File: crates/kosa_auth/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{FromRef, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use kosa_common::models::{Client, NewClient, PrincipalKind};
use kosa_common::KosaError;
use kosa_config::AppConfig;
use kosa_db::{BarberRepository, ClientRepository, DbError, Store};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::cookie::{clear_refresh_cookie, read_refresh_token, refresh_cookie};
use crate::error::AuthError;
use crate::password::{hash_password, verify_password};
use crate::token::{Principal, TokenIssuer};

/// Shared state for the session endpoints.
#[derive(Clone, FromRef)]
pub struct AuthState {
    pub store: Store,
    pub issuer: Arc<TokenIssuer>,
    pub config: Arc<AppConfig>,
}

#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(alias = "clientUsername")]
    pub username: String,
    #[serde(alias = "clientPassword")]
    pub password: String,
    #[serde(alias = "clientName")]
    pub name: String,
    #[serde(alias = "clientSurname")]
    pub surname: String,
    #[serde(alias = "clientPhone")]
    pub phone: String,
    #[serde(default, alias = "clientEmail")]
    pub email: Option<String>,
}

#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[derive(Debug, Clone, Deserialize)]
pub struct ClientLoginRequest {
    #[serde(alias = "clientUsername")]
    pub username: String,
    #[serde(alias = "clientPassword")]
    pub password: String,
}

#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[derive(Debug, Clone, Deserialize)]
pub struct BarberLoginRequest {
    #[serde(alias = "barberUsername")]
    pub username: String,
    #[serde(alias = "barberPassword")]
    pub password: String,
}

#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub auth: bool,
    pub access_token: String,
}

#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[serde(alias = "clientUsername")]
    pub username: String,
    #[serde(alias = "clientPassword")]
    pub current_password: String,
    #[serde(alias = "clientNewPassword")]
    pub new_password: String,
    /// Defaults to `client`.
    #[serde(default)]
    pub user_type: Option<PrincipalKind>,
}

#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessageResponse {
    pub message: String,
}

fn require_filled(fields: &[&str]) -> Result<(), AuthError> {
    if fields.iter().any(|f| f.trim().is_empty()) {
        return Err(AuthError::MissingCredentials);
    }
    Ok(())
}

/// Issue both tokens and pack them into a login response.
fn session_response(
    state: &AuthState,
    principal: Principal,
) -> Result<(HeaderMap, Json<LoginResponse>), KosaError> {
    let access_token = state.issuer.issue_access(&principal)?;
    let refresh_token = state.issuer.issue_refresh(&principal)?;
    let cookie = refresh_cookie(
        refresh_token,
        state.issuer.refresh_ttl(),
        state.config.auth.cookie_secure,
    );

    let mut headers = HeaderMap::new();
    headers.insert(
        header::SET_COOKIE,
        cookie
            .to_string()
            .parse()
            .map_err(|_| KosaError::InternalError("Invalid cookie header".to_string()))?,
    );
    Ok((
        headers,
        Json(LoginResponse {
            auth: true,
            access_token,
        }),
    ))
}

/// Register a new client account. New accounts are never VIP.
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Client created", body = Client),
        (status = 401, description = "Missing username or password"),
        (status = 409, description = "Username already taken")
    ),
    tag = "Auth"
))]
pub async fn register_handler(
    State(state): State<AuthState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Client>), KosaError> {
    require_filled(&[&payload.username, &payload.password])?;

    if state
        .store
        .clients
        .find_by_username(&payload.username)
        .await
        .map_err(AuthError::from)?
        .is_some()
    {
        return Err(AuthError::UsernameTaken.into());
    }

    let new_client = NewClient {
        username: payload.username,
        password_hash: hash_password(&payload.password)?,
        name: payload.name,
        surname: payload.surname,
        phone: payload.phone,
        email: payload.email.filter(|e| !e.trim().is_empty()),
        is_vip: false,
    };

    let client = match state.store.clients.insert(new_client).await {
        Ok(client) => client,
        // Lost a race with a concurrent registration of the same name.
        Err(DbError::UniqueViolation(_)) => return Err(AuthError::UsernameTaken.into()),
        Err(e) => return Err(AuthError::from(e).into()),
    };

    info!("Registered client {} ({})", client.id, client.username);
    Ok((StatusCode::CREATED, Json(client)))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/login",
    request_body = ClientLoginRequest,
    responses(
        (status = 200, description = "Access token; refresh token set as cookie", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Auth"
))]
pub async fn login_handler(
    State(state): State<AuthState>,
    Json(payload): Json<ClientLoginRequest>,
) -> Result<impl IntoResponse, KosaError> {
    require_filled(&[&payload.username, &payload.password])?;

    let client = state
        .store
        .clients
        .find_by_username(&payload.username)
        .await
        .map_err(AuthError::from)?
        .ok_or(AuthError::WrongCredentials)?;
    verify_password(&payload.password, &client.password_hash)?;

    info!("Client {} logged in", client.id);
    session_response(&state, Principal::client(client.id, client.is_vip))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/barberlogin",
    request_body = BarberLoginRequest,
    responses(
        (status = 200, description = "Access token; refresh token set as cookie", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Auth"
))]
pub async fn barber_login_handler(
    State(state): State<AuthState>,
    Json(payload): Json<BarberLoginRequest>,
) -> Result<impl IntoResponse, KosaError> {
    require_filled(&[&payload.username, &payload.password])?;

    let barber = state
        .store
        .barbers
        .find_by_username(&payload.username)
        .await
        .map_err(AuthError::from)?
        .ok_or(AuthError::WrongCredentials)?;
    verify_password(&payload.password, &barber.password_hash)?;

    info!("Barber {} logged in", barber.id);
    session_response(&state, Principal::barber(barber.id))
}

/// Exchange the refresh cookie for a short-lived access token.
///
/// The principal is re-read so a deleted account cannot refresh and a
/// client's VIP flag reflects its current value.
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/refresh",
    responses(
        (status = 200, description = "New access token", body = LoginResponse),
        (status = 401, description = "Missing, invalid or expired refresh cookie")
    ),
    tag = "Auth"
))]
pub async fn refresh_handler(
    State(state): State<AuthState>,
    headers: HeaderMap,
) -> Result<Json<LoginResponse>, KosaError> {
    let token = read_refresh_token(&headers).ok_or(AuthError::MissingCredentials)?;
    let claims = state.issuer.verify_refresh(&token).map_err(|e| {
        warn!("Rejected refresh token: {}", e);
        e
    })?;

    let principal = match claims.user_type {
        PrincipalKind::Client => {
            let client = state
                .store
                .clients
                .find_by_id(claims.sub)
                .await
                .map_err(AuthError::from)?
                .ok_or(AuthError::UnknownPrincipal)?;
            Principal::client(client.id, client.is_vip)
        }
        PrincipalKind::Barber => {
            let barber = state
                .store
                .barbers
                .find_by_id(claims.sub)
                .await
                .map_err(AuthError::from)?
                .ok_or(AuthError::UnknownPrincipal)?;
            Principal::barber(barber.id)
        }
    };

    Ok(Json(LoginResponse {
        auth: true,
        access_token: state.issuer.issue_renewed_access(&principal)?,
    }))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/logout",
    responses(
        (status = 200, description = "Refresh cookie cleared", body = MessageResponse)
    ),
    tag = "Auth"
))]
pub async fn logout_handler(State(state): State<AuthState>) -> Result<impl IntoResponse, KosaError> {
    let cookie = clear_refresh_cookie(state.config.auth.cookie_secure);
    let mut headers = HeaderMap::new();
    headers.insert(
        header::SET_COOKIE,
        cookie
            .to_string()
            .parse()
            .map_err(|_| KosaError::InternalError("Invalid cookie header".to_string()))?,
    );
    Ok((
        headers,
        Json(MessageResponse {
            message: "Logged out successfully.".to_string(),
        }),
    ))
}

/// Change a password after re-checking the current one.
#[cfg_attr(feature = "openapi", utoipa::path(
    put,
    path = "/change-password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 401, description = "Current password incorrect")
    ),
    tag = "Auth"
))]
pub async fn change_password_handler(
    State(state): State<AuthState>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, KosaError> {
    require_filled(&[
        &payload.username,
        &payload.current_password,
        &payload.new_password,
    ])?;

    let updated = match payload.user_type.unwrap_or(PrincipalKind::Client) {
        PrincipalKind::Client => {
            let client = state
                .store
                .clients
                .find_by_username(&payload.username)
                .await
                .map_err(AuthError::from)?
                .ok_or(AuthError::WrongCredentials)?;
            verify_password(&payload.current_password, &client.password_hash)?;
            state
                .store
                .clients
                .update_password(client.id, &hash_password(&payload.new_password)?)
                .await
                .map_err(AuthError::from)?
        }
        PrincipalKind::Barber => {
            let barber = state
                .store
                .barbers
                .find_by_username(&payload.username)
                .await
                .map_err(AuthError::from)?
                .ok_or(AuthError::WrongCredentials)?;
            verify_password(&payload.current_password, &barber.password_hash)?;
            state
                .store
                .barbers
                .update_password(barber.id, &hash_password(&payload.new_password)?)
                .await
                .map_err(AuthError::from)?
        }
    };

    if !updated {
        return Err(AuthError::UnknownPrincipal.into());
    }
    info!("Password changed for {}", payload.username);
    Ok(Json(MessageResponse {
        message: "Password changed successfully.".to_string(),
    }))
}
