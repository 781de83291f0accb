use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::AppState;
use api_shared::HealthService;
use dority_core::{CoreConfig, SessionService, SessionStore, source_from_config};

/// Main entry point for the Dority service
///
/// Resolves configuration once, picks the patient source and serves the REST API.
///
/// # Environment Variables
/// - `DORITY_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `FHIR_BASE_URL`: FHIR R4 server base URL; unset serves the demo roster
/// - `FHIR_ACCESS_TOKEN`: optional bearer token for the FHIR server
/// - `FHIR_TIMEOUT_SECS`: upstream request timeout (default: 10)
/// - `PATIENT_LIST_LIMIT`: roster size limit (default: 50, max 500)
/// - `DORITY_HIDE_ERROR_DETAILS`: omit `details` from 500 responses
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - configuration is invalid,
/// - the FHIR client cannot be built,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("dority=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = Arc::new(CoreConfig::from_env()?);
    let source = source_from_config(&cfg)?;
    let sessions = SessionService::new(cfg.clone(), source, Arc::new(SessionStore::new()));
    let app = api_rest::router(AppState::new(sessions, cfg.hide_error_details()));

    tracing::info!("++ Starting Dority REST on {}", cfg.rest_addr());
    tracing::info!("{}", HealthService::check_health().message);

    let listener = tokio::net::TcpListener::bind(cfg.rest_addr()).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("-- Dority REST stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
