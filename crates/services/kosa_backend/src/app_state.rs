// --- File: crates/services/kosa_backend/src/app_state.rs ---
//! Process-wide wiring: one store, one calendar client, one router.

use std::sync::Arc;

use axum::{routing::get, Router};
use http::{header, HeaderValue, Method};
use kosa_auth::{AuthState, TokenIssuer};
use kosa_booking::{BookingService, BookingSettings, BookingState};
use kosa_common::error::KosaError;
use kosa_common::services::{boxed, SharedCalendar};
use kosa_config::AppConfig;
use kosa_db::{DbClient, Store};
use kosa_directory::DirectoryState;
use kosa_gcal::{auth::create_calendar_hub, GoogleCalendarService};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

/// Everything the routers share, built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Store,
    /// `None` when `use_gcal` is off; appointments are then stored unmirrored.
    pub calendar: Option<SharedCalendar>,
}

impl AppState {
    /// Connects the database, creates the schema and, when enabled,
    /// authenticates the calendar client.
    pub async fn from_config(config: Arc<AppConfig>) -> Result<Self, KosaError> {
        let store = Store::new(DbClient::new(&config).await?);
        store.init_schema().await?;
        let calendar = connect_calendar(&config).await?;
        Ok(Self::with_parts(config, store, calendar))
    }

    pub fn with_parts(config: Arc<AppConfig>, store: Store, calendar: Option<SharedCalendar>) -> Self {
        Self {
            config,
            store,
            calendar,
        }
    }

    pub fn booking_service(&self) -> Result<BookingService, KosaError> {
        let settings = BookingSettings::from_config(&self.config)?;
        Ok(BookingService::new(
            self.store.clone(),
            self.calendar.clone(),
            settings,
        ))
    }

    /// The `/api` router with CORS and request tracing applied.
    pub fn router(&self, booking: BookingService) -> Result<Router, KosaError> {
        let issuer = Arc::new(TokenIssuer::new(&self.config.auth)?);

        let auth_state = AuthState {
            store: self.store.clone(),
            issuer: issuer.clone(),
            config: self.config.clone(),
        };
        let booking_state = BookingState {
            service: booking,
            issuer: issuer.clone(),
        };
        let directory_state = DirectoryState {
            store: self.store.clone(),
            issuer,
        };

        let api = Router::new()
            .route("/", get(|| async { "Welcome to the Kosa API!" }))
            .merge(kosa_auth::routes::routes(auth_state))
            .merge(kosa_booking::routes::routes(booking_state))
            .merge(kosa_directory::routes::routes(directory_state));

        Ok(Router::new()
            .nest("/api", api)
            .layer(cors_layer(&self.config.server.allowed_origins)?)
            .layer(TraceLayer::new_for_http()))
    }
}

async fn connect_calendar(config: &AppConfig) -> Result<Option<SharedCalendar>, KosaError> {
    if !config.use_gcal {
        info!("Google Calendar disabled; appointments will not be mirrored");
        return Ok(None);
    }
    let gcal = config.gcal.as_ref().ok_or_else(|| {
        KosaError::ConfigError("use_gcal is set but the [gcal] section is missing".to_string())
    })?;
    if gcal.calendar_id.as_deref().map_or(true, str::is_empty) {
        warn!("No shop calendar configured; only barbers with their own calendar are mirrored");
    }

    let hub = create_calendar_hub(gcal)
        .await
        .map_err(|e| KosaError::ExternalServiceError {
            service_name: "Google Calendar".to_string(),
            message: e.to_string(),
        })?;
    info!("Google Calendar service initialized");
    Ok(Some(boxed(GoogleCalendarService::new(Arc::new(hub)))))
}

/// Credentialed CORS: the refresh cookie only travels to listed origins.
pub fn cors_layer(allowed_origins: &[String]) -> Result<CorsLayer, KosaError> {
    let origins = allowed_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin).map_err(|_| {
                KosaError::ConfigError(format!("Invalid origin in server.allowed_origins: {origin}"))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true))
}
