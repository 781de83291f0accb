use crate::{ApiDoc, ApiError, AppState};
use api_shared::{DecisionReq, ErrorRes, HealthRes, HealthService, StartSessionReq};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use dority_core::{
    ActionCard, ActionId, NewAction, SessionId, SessionStarted, SimplifiedPatient,
};
use utoipa::OpenApi;

fn parse_session_id(raw: &str) -> Result<SessionId, ApiError> {
    SessionId::parse(raw).map_err(|e| ApiError::bad_request(e.to_string()))
}

fn parse_action_id(raw: &str) -> Result<ActionId, ApiError> {
    ActionId::parse(raw).map_err(|e| ApiError::bad_request(e.to_string()))
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for monitoring and load balancers.
#[axum::debug_handler]
pub(crate) async fn health() -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    get,
    path = "/api/patients",
    responses(
        (status = 200, description = "Patient roster in source order", body = [SimplifiedPatient]),
        (status = 500, description = "Patient source failure", body = ErrorRes)
    )
)]
/// List the patient roster.
#[axum::debug_handler]
pub(crate) async fn list_patients(
    State(state): State<AppState>,
) -> Result<Json<Vec<SimplifiedPatient>>, ApiError> {
    state
        .sessions
        .list_patients()
        .await
        .map(Json)
        .map_err(|e| ApiError::from_session(e, "Failed to fetch patients", state.hide_error_details))
}

#[utoipa::path(
    post,
    path = "/api/session/start",
    request_body = StartSessionReq,
    responses(
        (status = 200, description = "Session started", body = SessionStarted),
        (status = 400, description = "Missing or invalid patient id", body = ErrorRes),
        (status = 404, description = "Patient not found", body = ErrorRes),
        (status = 500, description = "Fetch or extraction failure", body = ErrorRes)
    )
)]
/// Start a clinical session for a patient.
///
/// Fetches the patient, flattens it, resolves pharmacy / practitioner / address and returns the
/// session bundle. A body that is missing or not JSON is treated like a missing `patientId`.
#[axum::debug_handler]
pub(crate) async fn start_session(
    State(state): State<AppState>,
    body: Option<Json<StartSessionReq>>,
) -> Result<Json<SessionStarted>, ApiError> {
    let Json(req) = body.unwrap_or_default();
    let today = Utc::now().date_naive();

    state
        .sessions
        .start(req.patient_id.as_deref(), req.patient_selection.as_ref(), today)
        .await
        .map(Json)
        .map_err(|e| ApiError::from_session(e, "Failed to start session", state.hide_error_details))
}

#[utoipa::path(
    delete,
    path = "/api/session/{sessionId}",
    params(("sessionId" = String, Path, description = "Session identifier")),
    responses(
        (status = 204, description = "Session ended and its actions dropped"),
        (status = 400, description = "Malformed session id", body = ErrorRes),
        (status = 404, description = "Unknown session", body = ErrorRes)
    )
)]
/// End a session.
#[axum::debug_handler]
pub(crate) async fn end_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let session_id = parse_session_id(&session_id)?;
    state
        .sessions
        .end(&session_id)
        .map_err(|e| ApiError::from_session(e, "Failed to end session", state.hide_error_details))?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/session/{sessionId}/actions",
    params(("sessionId" = String, Path, description = "Session identifier")),
    responses(
        (status = 200, description = "Action cards in insertion order", body = [ActionCard]),
        (status = 404, description = "Unknown session", body = ErrorRes)
    )
)]
/// List a session's suggested actions as rendered cards.
#[axum::debug_handler]
pub(crate) async fn list_actions(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<Vec<ActionCard>>, ApiError> {
    let session_id = parse_session_id(&session_id)?;
    let actions = state
        .sessions
        .store()
        .list_actions(&session_id)
        .map_err(|e| ApiError::from_action(e, state.hide_error_details))?;
    Ok(Json(actions.iter().map(ActionCard::from).collect()))
}

#[utoipa::path(
    post,
    path = "/api/session/{sessionId}/actions",
    params(("sessionId" = String, Path, description = "Session identifier")),
    request_body = NewAction,
    responses(
        (status = 201, description = "Action added as pending", body = ActionCard),
        (status = 400, description = "Invalid action", body = ErrorRes),
        (status = 404, description = "Unknown session", body = ErrorRes)
    )
)]
/// Add a suggested action to a session.
#[axum::debug_handler]
pub(crate) async fn add_action(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    body: Result<Json<NewAction>, JsonRejection>,
) -> Result<(StatusCode, Json<ActionCard>), ApiError> {
    let session_id = parse_session_id(&session_id)?;
    let Json(input) = body?;
    let action = state
        .sessions
        .store()
        .add_action(&session_id, input)
        .map_err(|e| ApiError::from_action(e, state.hide_error_details))?;
    Ok((StatusCode::CREATED, Json(ActionCard::from(&action))))
}

#[utoipa::path(
    post,
    path = "/api/session/{sessionId}/actions/{actionId}/decision",
    params(
        ("sessionId" = String, Path, description = "Session identifier"),
        ("actionId" = String, Path, description = "Action identifier (32 lowercase hex)")
    ),
    request_body = DecisionReq,
    responses(
        (status = 200, description = "Decision recorded", body = ActionCard),
        (status = 400, description = "Malformed id or decision body", body = ErrorRes),
        (status = 404, description = "Unknown session or action", body = ErrorRes),
        (status = 409, description = "Action already decided", body = ErrorRes)
    )
)]
/// Approve or reject a pending action. Decisions are final.
#[axum::debug_handler]
pub(crate) async fn decide_action(
    State(state): State<AppState>,
    Path((session_id, action_id)): Path<(String, String)>,
    body: Result<Json<DecisionReq>, JsonRejection>,
) -> Result<Json<ActionCard>, ApiError> {
    let session_id = parse_session_id(&session_id)?;
    let action_id = parse_action_id(&action_id)?;
    let Json(req) = body?;
    let action = state
        .sessions
        .store()
        .update_action_status(&session_id, &action_id, req.decision)
        .map_err(|e| ApiError::from_action(e, state.hide_error_details))?;
    Ok(Json(ActionCard::from(&action)))
}

/// The OpenAPI document for this router.
pub(crate) async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
