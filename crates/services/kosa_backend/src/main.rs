// File: services/kosa_backend/src/main.rs
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use kosa_backend::AppState;
use kosa_common::error::KosaError;
use kosa_common::logging;
use kosa_config::load_config;
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        error!("Kosa backend stopped: {}", err);
        eprintln!("Kosa backend stopped: {err}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), KosaError> {
    let config = Arc::new(load_config().map_err(|e| KosaError::ConfigError(e.to_string()))?);

    // Keep the guard alive so the file writer flushes until shutdown.
    let _log_guard = logging::init_with_level(
        logging::parse_level(&config.logging.level),
        config.logging.directory.as_deref(),
    );

    let state = AppState::from_config(config.clone()).await?;
    let booking = state.booking_service()?;

    if let Some(secs) = config.booking.reconcile_interval_secs.filter(|secs| *secs > 0) {
        info!("Calendar reconciliation every {}s", secs);
        booking.clone().spawn_reconciler(Duration::from_secs(secs));
    }

    #[allow(unused_mut)] // only the openapi feature adds routes
    let mut app: Router = state.router(booking)?;

    // Conditionally add Swagger UI and JSON endpoint if openapi feature enabled
    #[cfg(feature = "openapi")]
    {
        use kosa_auth::doc::AuthApiDoc;
        use kosa_booking::doc::BookingApiDoc;
        use kosa_directory::doc::DirectoryApiDoc;
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        #[derive(OpenApi)]
        #[openapi(
            info(
                title = "Kosa API",
                version = "0.1.0",
                description = "Barbershop appointments, barbers, services and clients",
                license(name = "MIT", url = "https://opensource.org/licenses/MIT")
            ),
            components(),
            tags( (name = "Kosa", description = "Core service endpoints")),
            servers( (url = "/api", description = "Main API Prefix")),
        )]
        struct ApiDoc;

        let mut openapi_doc = ApiDoc::openapi();
        openapi_doc.merge(AuthApiDoc::openapi());
        openapi_doc.merge(BookingApiDoc::openapi());
        openapi_doc.merge(DirectoryApiDoc::openapi());
        info!("Adding Swagger UI at /api/docs");

        let swagger_ui = SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", openapi_doc);
        app = app.merge(swagger_ui);
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Starting server at http://{}", addr);
    info!("API endpoints available at http://{}/api", addr);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", err);
    }
}
