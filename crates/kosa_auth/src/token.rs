//! Access and refresh tokens.
//!
//! Both are HS256 JWTs signed with separate secrets. The access token carries
//! everything request handlers need (`id`, `userType`, `isVIP`); the refresh
//! token only identifies the principal and is exchanged for a new access
//! token after the account has been re-read.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use kosa_common::models::PrincipalKind;
use kosa_config::{AuthConfig, SECRET_MARKER};
use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// The authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub id: i64,
    pub kind: PrincipalKind,
    pub is_vip: bool,
}

impl Principal {
    pub fn client(id: i64, is_vip: bool) -> Self {
        Self {
            id,
            kind: PrincipalKind::Client,
            is_vip,
        }
    }

    pub fn barber(id: i64) -> Self {
        Self {
            id,
            kind: PrincipalKind::Barber,
            is_vip: false,
        }
    }

    pub fn is_barber(&self) -> bool {
        self.kind == PrincipalKind::Barber
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AccessClaims {
    pub sub: i64,
    pub user_type: PrincipalKind,
    #[serde(rename = "isVIP", default)]
    pub is_vip: bool,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RefreshClaims {
    pub sub: i64,
    pub user_type: PrincipalKind,
    pub iat: i64,
    pub exp: i64,
}

/// Signs and verifies tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    access_ttl: Duration,
    renewed_access_ttl: Duration,
    refresh_ttl: Duration,
    validation: Validation,
}

fn usable_secret(name: &str, value: &str) -> Result<(), AuthError> {
    if value.is_empty() || value == SECRET_MARKER {
        return Err(AuthError::Config(format!("{name} is not set")));
    }
    Ok(())
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Result<Self, AuthError> {
        usable_secret("auth.access_secret", &config.access_secret)?;
        usable_secret("auth.refresh_secret", &config.refresh_secret)?;
        if config.access_secret == config.refresh_secret {
            return Err(AuthError::Config(
                "access and refresh secrets must differ".to_string(),
            ));
        }

        Ok(Self {
            access_encoding: EncodingKey::from_secret(config.access_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(config.access_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(config.refresh_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(config.refresh_secret.as_bytes()),
            access_ttl: Duration::minutes(config.access_ttl_minutes),
            renewed_access_ttl: Duration::minutes(config.renewed_access_ttl_minutes),
            refresh_ttl: Duration::days(config.refresh_ttl_days),
            validation: Validation::new(Algorithm::HS256),
        })
    }

    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    fn access_token(&self, principal: &Principal, ttl: Duration) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = AccessClaims {
            sub: principal.id,
            user_type: principal.kind,
            is_vip: principal.is_vip,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.access_encoding)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }

    /// Access token issued at login.
    pub fn issue_access(&self, principal: &Principal) -> Result<String, AuthError> {
        self.access_token(principal, self.access_ttl)
    }

    /// Shorter-lived access token issued by the refresh endpoint.
    pub fn issue_renewed_access(&self, principal: &Principal) -> Result<String, AuthError> {
        self.access_token(principal, self.renewed_access_ttl)
    }

    pub fn issue_refresh(&self, principal: &Principal) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = RefreshClaims {
            sub: principal.id,
            user_type: principal.kind,
            iat: now.timestamp(),
            exp: (now + self.refresh_ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.refresh_encoding)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }

    pub fn verify_access(&self, token: &str) -> Result<Principal, AuthError> {
        let data = decode::<AccessClaims>(token, &self.access_decoding, &self.validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        let claims = data.claims;
        Ok(Principal {
            id: claims.sub,
            kind: claims.user_type,
            is_vip: claims.user_type == PrincipalKind::Client && claims.is_vip,
        })
    }

    pub fn verify_refresh(&self, token: &str) -> Result<RefreshClaims, AuthError> {
        decode::<RefreshClaims>(token, &self.refresh_decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AuthConfig {
        AuthConfig {
            access_secret: "access-secret".to_string(),
            refresh_secret: "refresh-secret".to_string(),
            ..AuthConfig::default()
        }
    }

    #[test]
    fn access_token_round_trip() {
        let issuer = TokenIssuer::new(&config()).unwrap();
        let token = issuer.issue_access(&Principal::client(7, true)).unwrap();
        let principal = issuer.verify_access(&token).unwrap();
        assert_eq!(principal, Principal::client(7, true));
    }

    #[test]
    fn refresh_token_is_not_an_access_token() {
        let issuer = TokenIssuer::new(&config()).unwrap();
        let refresh = issuer.issue_refresh(&Principal::barber(2)).unwrap();
        assert!(issuer.verify_access(&refresh).is_err());
        let claims = issuer.verify_refresh(&refresh).unwrap();
        assert_eq!(claims.user_type, PrincipalKind::Barber);
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 3600);
    }

    #[test]
    fn expired_token_rejected() {
        let issuer = TokenIssuer::new(&AuthConfig {
            access_ttl_minutes: -120,
            ..config()
        })
        .unwrap();
        let token = issuer.issue_access(&Principal::barber(1)).unwrap();
        assert!(matches!(
            issuer.verify_access(&token),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn barber_tokens_never_carry_vip() {
        let issuer = TokenIssuer::new(&config()).unwrap();
        let forged = Principal {
            id: 1,
            kind: PrincipalKind::Barber,
            is_vip: true,
        };
        let token = issuer.issue_access(&forged).unwrap();
        assert!(!issuer.verify_access(&token).unwrap().is_vip);
    }

    #[test]
    fn unresolved_secret_is_a_config_error() {
        let result = TokenIssuer::new(&AuthConfig {
            access_secret: SECRET_MARKER.to_string(),
            ..config()
        });
        assert!(matches!(result, Err(AuthError::Config(_))));
    }

    #[test]
    fn access_claims_use_camel_case() {
        let claims = AccessClaims {
            sub: 1,
            user_type: PrincipalKind::Client,
            is_vip: true,
            iat: 0,
            exp: 1,
        };
        let value = serde_json::to_value(claims).unwrap();
        assert_eq!(value["userType"], "client");
        assert_eq!(value["isVIP"], true);
    }
}
