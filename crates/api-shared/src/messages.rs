//! Request and response envelopes.
//!
//! Domain payloads (`PatientData`, `ActionCard`, ...) are defined in `dority-core`; this module
//! only holds the wrappers that exist because of the wire protocol.

use dority_core::{Decision, PatientSelection};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// Error body returned by every failing endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorRes {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Body of `POST /api/session/start`.
///
/// `patient_id` is optional on the wire so a missing id reaches the handler and is reported
/// as a validation error rather than a body rejection.
#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct StartSessionReq {
    pub patient_id: Option<String>,
    pub patient_selection: Option<PatientSelection>,
}

/// Body of `POST /api/session/{sessionId}/actions/{actionId}/decision`.
#[derive(Clone, Copy, Debug, Deserialize, ToSchema)]
pub struct DecisionReq {
    pub decision: Decision,
}
