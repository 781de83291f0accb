//! # API REST
//!
//! REST API implementation for Dority.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - The OpenAPI document, served as JSON
//! - REST-specific concerns (JSON serialisation, CORS, error bodies)
//!
//! Uses `api-shared` for envelopes and `dority-core` for everything else.

#![warn(rust_2018_idioms)]

mod error;
mod handlers;

pub use error::ApiError;

use axum::routing::{delete, get, post};
use axum::Router;
use dority_core::SessionService;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;

/// Shared state for all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionService,
    /// Omit `details` from 500 responses.
    pub hide_error_details: bool,
}

impl AppState {
    pub fn new(sessions: SessionService, hide_error_details: bool) -> Self {
        Self {
            sessions,
            hide_error_details,
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::list_patients,
        handlers::start_session,
        handlers::end_session,
        handlers::list_actions,
        handlers::add_action,
        handlers::decide_action,
    ),
    components(schemas(
        api_shared::HealthRes,
        api_shared::ErrorRes,
        api_shared::StartSessionReq,
        api_shared::DecisionReq,
        dority_core::PatientSelection,
        dority_core::SessionStarted,
        dority_core::PatientSummary,
        dority_core::PatientData,
        dority_core::PostalAddress,
        dority_core::EmergencyContact,
        dority_core::SimplifiedPatient,
        dority_core::ActionCard,
        dority_core::SuggestedAction,
        dority_core::NewAction,
        dority_core::ActionType,
        dority_core::ActionStatus,
        dority_core::Decision,
        dority_core::SafetyLevel,
        dority_core::actions::FhirPreview,
        dority_core::actions::ProgressBand,
        dority_core::actions::SafetyBanner,
        dority_core::actions::PreviewRow,
    ))
)]
pub struct ApiDoc;

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/patients", get(handlers::list_patients))
        .route("/api/session/start", post(handlers::start_session))
        .route("/api/session/:session_id", delete(handlers::end_session))
        .route(
            "/api/session/:session_id/actions",
            get(handlers::list_actions).post(handlers::add_action),
        )
        .route(
            "/api/session/:session_id/actions/:action_id/decision",
            post(handlers::decide_action),
        )
        .route("/api-docs/openapi.json", get(handlers::openapi_json))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests;
