//! Request extractors for authenticated routes.
//!
//! Handlers take [`AuthUser`] when any signed-in principal may call them and
//! [`BarberUser`] when only barbers may. Both read `Authorization: Bearer`.

use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use kosa_common::KosaError;

use crate::error::AuthError;
use crate::token::{Principal, TokenIssuer};

fn bearer_token(parts: &Parts) -> Result<&str, AuthError> {
    let value = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;
    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::MissingCredentials)
}

fn principal_from_parts<S>(parts: &Parts, state: &S) -> Result<Principal, AuthError>
where
    Arc<TokenIssuer>: FromRef<S>,
{
    let issuer = Arc::<TokenIssuer>::from_ref(state);
    issuer.verify_access(bearer_token(parts)?)
}

/// Any authenticated client or barber.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Principal);

impl<S> FromRequestParts<S> for AuthUser
where
    Arc<TokenIssuer>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = KosaError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(AuthUser(principal_from_parts(parts, state)?))
    }
}

/// An authenticated barber. Clients get 403.
#[derive(Debug, Clone, Copy)]
pub struct BarberUser(pub Principal);

impl<S> FromRequestParts<S> for BarberUser
where
    Arc<TokenIssuer>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = KosaError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let principal = principal_from_parts(parts, state)?;
        if !principal.is_barber() {
            return Err(AuthError::Forbidden("Barber access required".to_string()).into());
        }
        Ok(BarberUser(principal))
    }
}
