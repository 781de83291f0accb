//! Presentation model for a single action card.
//!
//! Clients render straight from these flags; no display rule is left to the browser.

use super::{completion_percentage, ActionStatus, SafetyLevel, SuggestedAction};
use serde::Serialize;
use utoipa::ToSchema;

/// Colour band of the completion bar.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ProgressBand {
    Complete,
    High,
    Medium,
    Low,
}

impl ProgressBand {
    pub fn for_percentage(percent: u8) -> Self {
        match percent {
            100.. => ProgressBand::Complete,
            75..=99 => ProgressBand::High,
            50..=74 => ProgressBand::Medium,
            _ => ProgressBand::Low,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SafetyBanner {
    pub level: SafetyLevel,
    pub message: String,
}

/// Labelled line in the "FHIR Resource Preview" panel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
pub struct PreviewRow {
    pub label: String,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActionCard {
    pub action: SuggestedAction,
    pub completion_percentage: u8,
    pub progress_band: ProgressBand,
    /// "Approved" or "Rejected" once decided.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
    pub dimmed: bool,
    pub struck_through: bool,
    pub show_decision_buttons: bool,
    pub show_form_toggle: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dose_line: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pharmacy_line: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub safety_banner: Option<SafetyBanner>,
    pub preview_rows: Vec<PreviewRow>,
}

impl From<&SuggestedAction> for ActionCard {
    fn from(action: &SuggestedAction) -> Self {
        let percent = completion_percentage(action);
        let rejected = action.status == ActionStatus::Rejected;

        let badge = match action.status {
            ActionStatus::Approved => Some("Approved".to_string()),
            ActionStatus::Rejected => Some("Rejected".to_string()),
            ActionStatus::Pending => None,
        };

        let safety_banner = match (action.safety_flag, action.safety_message.as_deref()) {
            (Some(level), Some(message)) => Some(SafetyBanner {
                level,
                message: message.to_string(),
            }),
            _ => None,
        };

        Self {
            action: action.clone(),
            completion_percentage: percent,
            progress_band: ProgressBand::for_percentage(percent),
            badge,
            dimmed: rejected,
            struck_through: rejected,
            show_decision_buttons: !action.status.is_decided(),
            show_form_toggle: !rejected,
            dose_line: action.dose_info.as_ref().map(|d| format!("Dose: {d}")),
            pharmacy_line: action.pharmacy.as_ref().map(|p| format!("Pharmacy: {p}")),
            rationale: action.rationale.clone(),
            safety_banner,
            preview_rows: preview_rows(action),
        }
    }
}

fn preview_rows(action: &SuggestedAction) -> Vec<PreviewRow> {
    let preview = &action.fhir_preview;
    let mut rows = vec![
        PreviewRow {
            label: "Resource Type".into(),
            value: preview.resource_type.clone(),
        },
        PreviewRow {
            label: "Status".into(),
            value: preview.status.clone(),
        },
        PreviewRow {
            label: "Title".into(),
            value: action.title.clone(),
        },
    ];
    if let Some(dose) = &action.dose_info {
        rows.push(PreviewRow {
            label: "Dosage".into(),
            value: dose.clone(),
        });
    }
    if let Some(pharmacy) = &action.pharmacy {
        rows.push(PreviewRow {
            label: "Pharmacy".into(),
            value: pharmacy.clone(),
        });
    }
    rows.push(PreviewRow {
        label: "Rationale".into(),
        value: action.rationale.clone().unwrap_or_default(),
    });
    rows
}
