use super::*;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use dority_core::{
    CoreConfig, FixtureSource, PatientSource, ResourceId, SessionStore, SimplifiedPatient,
    SourceError,
};
use fhir::PatientResource;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::ServiceExt;

#[derive(Default)]
struct CountingSource {
    inner: FixtureSource,
    reads: AtomicUsize,
}

#[async_trait]
impl PatientSource for CountingSource {
    async fn read_patient(&self, id: &ResourceId) -> Result<PatientResource, SourceError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.read_patient(id).await
    }

    async fn list_patients(&self, limit: usize) -> Result<Vec<SimplifiedPatient>, SourceError> {
        self.inner.list_patients(limit).await
    }
}

struct FailingSource;

#[async_trait]
impl PatientSource for FailingSource {
    async fn read_patient(&self, _id: &ResourceId) -> Result<PatientResource, SourceError> {
        Err(SourceError::Upstream("connection refused".into()))
    }

    async fn list_patients(&self, _limit: usize) -> Result<Vec<SimplifiedPatient>, SourceError> {
        Err(SourceError::Upstream("connection refused".into()))
    }
}

fn state_with(source: Arc<dyn PatientSource>, hide_error_details: bool) -> AppState {
    let cfg = Arc::new(CoreConfig::new("127.0.0.1:0".into(), None, 50, hide_error_details).unwrap());
    let sessions = SessionService::new(cfg, source, Arc::new(SessionStore::new()));
    AppState::new(sessions, hide_error_details)
}

fn demo_app() -> Router {
    router(state_with(Arc::new(FixtureSource::demo()), false))
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn start_session(app: &Router, patient_id: &str) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/session/start",
            json!({ "patientId": patient_id }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["sessionId"]
        .as_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn health_is_alive() {
    let response = demo_app().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({ "ok": true, "message": "Dority is alive" })
    );
}

#[tokio::test]
async fn lists_demo_roster() {
    let response = demo_app().oneshot(get("/api/patients")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let roster = body.as_array().unwrap();
    assert_eq!(roster.len(), 8);
    assert_eq!(
        roster[0],
        json!({
            "patientId": "patient-001",
            "patientFirstName": "John",
            "patientLastName": "Smith"
        })
    );
}

#[tokio::test]
async fn missing_patient_id_is_400_without_fetch() {
    let source = Arc::new(CountingSource {
        inner: FixtureSource::demo(),
        ..Default::default()
    });
    let app = router(state_with(source.clone(), false));

    for body in [json!({}), json!({ "patientId": "" }), json!({ "patientId": null })] {
        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/session/start", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({ "error": "Patient ID is required" })
        );
    }

    let no_body = Request::builder()
        .method("POST")
        .uri("/api/session/start")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(no_body).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert_eq!(source.reads.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn start_session_returns_full_bundle() {
    let response = demo_app()
        .oneshot(json_request(
            "POST",
            "/api/session/start",
            json!({
                "patientId": "patient-002",
                "patientSelection": { "preferredPharmacy": "Caller Pharmacy" }
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert!(body["sessionId"].as_str().unwrap().starts_with("session-"));
    assert_eq!(body["patient"]["name"], "Sarah Johnson");
    assert_eq!(body["patient"]["mrn"], "MRN-100002");
    assert_eq!(body["patient"]["preferredPharmacy"], "Dr. Ben Ortiz");
    assert_eq!(body["patient"]["allergies"], json!([]));
    assert_eq!(body["patient"]["emergencyContactName"], "Linda Johnson");
    assert_eq!(body["patientData"]["fullName"], "Sarah Johnson");
    assert_eq!(
        body["patientData"]["address"]["full"],
        "48 Maple Avenue, Apt 3B, Portland, OR, 97201, USA"
    );
    assert!(body["historySummary"]
        .as_str()
        .unwrap()
        .ends_with("Note: Full medical history available in EMR"));
}

#[tokio::test]
async fn unknown_patient_is_404() {
    let response = demo_app()
        .oneshot(json_request(
            "POST",
            "/api/session/start",
            json!({ "patientId": "patient-999" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn upstream_failure_is_500_with_details() {
    let app = router(state_with(Arc::new(FailingSource), false));
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/session/start",
            json!({ "patientId": "patient-001" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = body_json(response).await;
    assert_eq!(body["error"], "Failed to start session");
    assert!(body["details"]
        .as_str()
        .unwrap()
        .contains("connection refused"));
}

#[tokio::test]
async fn upstream_failure_can_hide_details() {
    let app = router(state_with(Arc::new(FailingSource), true));
    let response = app.oneshot(get("/api/patients")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(response).await,
        json!({ "error": "Failed to fetch patients" })
    );
}

#[tokio::test]
async fn action_lifecycle_over_http() {
    let app = demo_app();
    let session_id = start_session(&app, "patient-001").await;
    let actions_uri = format!("/api/session/{session_id}/actions");

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &actions_uri,
            json!({
                "type": "medication",
                "title": "Start amoxicillin",
                "doseInfo": "500mg TDS for 5 days",
                "pharmacy": "CVS Pharmacy - Main St"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let card = body_json(response).await;
    assert_eq!(card["action"]["status"], "pending");
    assert_eq!(card["completionPercentage"], 50);
    assert_eq!(card["showDecisionButtons"], true);
    let action_id = card["action"]["id"].as_str().unwrap().to_string();

    let decision_uri = format!("{actions_uri}/{action_id}/decision");
    let response = app
        .clone()
        .oneshot(json_request("POST", &decision_uri, json!({ "decision": "reject" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let card = body_json(response).await;
    assert_eq!(card["action"]["status"], "rejected");
    assert_eq!(card["action"]["fhirPreview"]["status"], "cancelled");
    assert_eq!(card["dimmed"], true);
    assert_eq!(card["showDecisionButtons"], false);

    let response = app
        .clone()
        .oneshot(json_request("POST", &decision_uri, json!({ "decision": "approve" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app.clone().oneshot(get(&actions_uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cards = body_json(response).await;
    assert_eq!(cards.as_array().unwrap().len(), 1);
    assert_eq!(cards[0]["action"]["status"], "rejected");
}

#[tokio::test]
async fn unknown_session_and_action_are_404() {
    let app = demo_app();
    let response = app
        .clone()
        .oneshot(get("/api/session/session-1760870400000-abcdefghi/actions"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let session_id = start_session(&app, "patient-003").await;
    let uri = format!(
        "/api/session/{session_id}/actions/{}/decision",
        "0123456789abcdef0123456789abcdef"
    );
    let response = app
        .clone()
        .oneshot(json_request("POST", &uri, json!({ "decision": "approve" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_ids_are_400() {
    let app = demo_app();
    let response = app
        .clone()
        .oneshot(get("/api/session/not-a-session/actions"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let session_id = start_session(&app, "patient-003").await;
    let uri = format!("/api/session/{session_id}/actions/NOT-HEX/decision");
    let response = app
        .oneshot(json_request("POST", &uri, json!({ "decision": "approve" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn serves_openapi_document() {
    let response = demo_app()
        .oneshot(get("/api-docs/openapi.json"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let doc = body_json(response).await;
    assert!(doc["paths"].get("/api/session/start").is_some());
    assert!(doc["components"]["schemas"].get("ActionCard").is_some());
}

#[tokio::test]
async fn ended_session_is_gone() {
    let app = demo_app();
    let session_id = start_session(&app, "patient-001").await;
    let session_uri = format!("/api/session/{session_id}");

    let delete = |uri: &str| {
        Request::builder()
            .method("DELETE")
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    };

    let response = app.clone().oneshot(delete(&session_uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .clone()
        .oneshot(get(&format!("{session_uri}/actions")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.clone().oneshot(delete(&session_uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(delete("/api/session/not-a-session"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_action_bodies_are_400_envelopes() {
    let app = demo_app();
    let session_id = start_session(&app, "patient-001").await;
    let actions_uri = format!("/api/session/{session_id}/actions");

    let response = app
        .clone()
        .oneshot(json_request("POST", &actions_uri, json!({ "type": "surgery" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(!body["error"].as_str().unwrap().is_empty());

    let response = app
        .clone()
        .oneshot(json_request("POST", &actions_uri, json!({ "type": "lab", "title": "FBC" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let action_id = body_json(response).await["action"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .oneshot(json_request(
            "POST",
            &format!("{actions_uri}/{action_id}/decision"),
            json!({ "decision": "maybe" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"].is_string());
}
