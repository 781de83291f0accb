//! Suggested clinical actions and their approval lifecycle.
//!
//! An action starts `pending` and may be decided exactly once:
//!
//! ```text
//! pending --approve--> approved
//! pending --reject---> rejected
//! ```
//!
//! Both decided states are terminal. There is no undo; a second decision is an error and leaves
//! the action untouched.

mod card;
mod store;

pub use card::{ActionCard, PreviewRow, ProgressBand, SafetyBanner};
pub use store::SessionStore;

use crate::error::{ActionError, ActionResult};
use dority_uuid::ActionId;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Kind of clinical action, which fixes the FHIR resource it would become.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    Medication,
    Imaging,
    Lab,
    Referral,
    Followup,
    Aftercare,
}

impl ActionType {
    pub fn fhir_resource_type(self) -> &'static str {
        match self {
            ActionType::Medication => "MedicationRequest",
            ActionType::Imaging | ActionType::Lab | ActionType::Referral => "ServiceRequest",
            ActionType::Followup => "Appointment",
            ActionType::Aftercare => "CarePlan",
        }
    }

    /// FHIR status code for a resource of this kind in the given lifecycle state.
    pub fn fhir_status(self, status: ActionStatus) -> &'static str {
        match (self, status) {
            (ActionType::Followup, ActionStatus::Pending) => "proposed",
            (ActionType::Followup, ActionStatus::Approved) => "booked",
            (ActionType::Followup, ActionStatus::Rejected) => "cancelled",
            (ActionType::Medication, ActionStatus::Rejected) => "cancelled",
            (_, ActionStatus::Pending) => "draft",
            (_, ActionStatus::Approved) => "active",
            (_, ActionStatus::Rejected) => "revoked",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ActionStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ActionStatus {
    pub fn is_decided(self) -> bool {
        !matches!(self, ActionStatus::Pending)
    }

    /// Apply a clinician decision.
    ///
    /// # Errors
    ///
    /// [`ActionError::AlreadyDecided`] unless the action is still pending.
    pub fn apply(self, decision: Decision) -> ActionResult<ActionStatus> {
        match (self, decision) {
            (ActionStatus::Pending, Decision::Approve) => Ok(ActionStatus::Approved),
            (ActionStatus::Pending, Decision::Reject) => Ok(ActionStatus::Rejected),
            (current, _) => Err(ActionError::AlreadyDecided { current }),
        }
    }
}

impl fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ActionStatus::Pending => "pending",
            ActionStatus::Approved => "approved",
            ActionStatus::Rejected => "rejected",
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approve,
    Reject,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SafetyLevel {
    High,
    Medium,
    Low,
}

/// Summary of the FHIR resource an action would create once signed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FhirPreview {
    pub resource_type: String,
    pub status: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dosage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pharmacy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedAction {
    #[schema(value_type = String)]
    pub id: ActionId,
    #[serde(rename = "type")]
    pub action_type: ActionType,
    pub status: ActionStatus,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dose_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pharmacy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub safety_flag: Option<SafetyLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub safety_message: Option<String>,
    pub fhir_preview: FhirPreview,
}

/// Caller-supplied fields for a new suggestion.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct NewAction {
    #[serde(rename = "type")]
    pub action_type: Option<ActionType>,
    pub title: String,
    pub details: Option<String>,
    pub rationale: Option<String>,
    pub dose_info: Option<String>,
    pub pharmacy: Option<String>,
    pub safety_flag: Option<SafetyLevel>,
    pub safety_message: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl SuggestedAction {
    /// Create a pending action with a fresh id.
    ///
    /// # Errors
    ///
    /// [`ActionError::InvalidInput`] when the type is missing or the title is blank.
    pub fn new(input: NewAction) -> ActionResult<Self> {
        let action_type = input
            .action_type
            .ok_or_else(|| ActionError::InvalidInput("type is required".into()))?;
        let title = non_blank(Some(input.title))
            .ok_or_else(|| ActionError::InvalidInput("title is required".into()))?;

        let mut action = Self {
            id: ActionId::new(),
            action_type,
            status: ActionStatus::Pending,
            title,
            details: non_blank(input.details),
            rationale: non_blank(input.rationale),
            dose_info: non_blank(input.dose_info),
            pharmacy: non_blank(input.pharmacy),
            safety_flag: input.safety_flag,
            safety_message: non_blank(input.safety_message),
            fhir_preview: FhirPreview {
                resource_type: String::new(),
                status: String::new(),
                title: String::new(),
                dosage: None,
                pharmacy: None,
                rationale: None,
            },
        };
        action.refresh_preview();
        Ok(action)
    }

    /// Record a decision and bring the preview status in line with it.
    pub fn decide(&mut self, decision: Decision) -> ActionResult<()> {
        self.status = self.status.apply(decision)?;
        self.refresh_preview();
        Ok(())
    }

    fn refresh_preview(&mut self) {
        self.fhir_preview = FhirPreview {
            resource_type: self.action_type.fhir_resource_type().to_string(),
            status: self.action_type.fhir_status(self.status).to_string(),
            title: self.title.clone(),
            dosage: self.dose_info.clone(),
            pharmacy: self.pharmacy.clone(),
            rationale: self.rationale.clone(),
        };
    }
}

/// Share of the six tracked fields that are filled in, as a rounded whole percentage.
///
/// Tracked: title, details, rationale, dose info, pharmacy, safety flag. Purely presentational;
/// it has no bearing on whether an action may be decided.
pub fn completion_percentage(action: &SuggestedAction) -> u8 {
    let filled = |v: Option<&str>| v.is_some_and(|s| !s.trim().is_empty());
    let count = [
        filled(Some(action.title.as_str())),
        filled(action.details.as_deref()),
        filled(action.rationale.as_deref()),
        filled(action.dose_info.as_deref()),
        filled(action.pharmacy.as_deref()),
        action.safety_flag.is_some(),
    ]
    .into_iter()
    .filter(|f| *f)
    .count();

    // count <= 6, so the result is at most 100.
    ((count * 100 + 3) / 6) as u8
}
