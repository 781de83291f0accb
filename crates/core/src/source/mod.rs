//! Patient sources.
//!
//! A [`PatientSource`] is the one seam to the outside EHR. The session service only ever sees
//! the trait, so the HTTP client and the in-memory fixture roster are interchangeable.

mod fixture;
mod http;

pub use fixture::FixtureSource;
pub use http::FhirHttpSource;

use crate::config::CoreConfig;
use crate::error::SourceError;
use crate::patient_data::preferred_name;
use async_trait::async_trait;
use dority_types::ResourceId;
use fhir::PatientResource;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

/// Fetches FHIR `Patient` resources.
#[async_trait]
pub trait PatientSource: Send + Sync {
    /// Read a single patient by logical id.
    ///
    /// # Errors
    ///
    /// [`SourceError::NotFound`] when the source has no such patient; other variants for
    /// transport or payload failures.
    async fn read_patient(&self, id: &ResourceId) -> Result<PatientResource, SourceError>;

    /// List at most `limit` patients, in source order.
    async fn list_patients(&self, limit: usize) -> Result<Vec<SimplifiedPatient>, SourceError>;
}

/// The configured source: the FHIR server if one is set, otherwise the demo roster.
pub fn source_from_config(cfg: &CoreConfig) -> Result<Arc<dyn PatientSource>, SourceError> {
    match cfg.fhir_server() {
        Some(server) => {
            tracing::info!(base_url = server.base_url(), "using FHIR server patient source");
            Ok(Arc::new(FhirHttpSource::new(server)?))
        }
        None => {
            tracing::warn!("FHIR_BASE_URL not set; serving the demo patient roster");
            Ok(Arc::new(FixtureSource::demo()))
        }
    }
}

/// Roster entry for patient pickers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SimplifiedPatient {
    pub patient_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_last_name: Option<String>,
}

impl SimplifiedPatient {
    /// Roster entry for `resource`; `None` when the resource has no id to select it by.
    pub fn from_resource(resource: &PatientResource) -> Option<Self> {
        let patient_id = resource
            .id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())?
            .to_string();
        let name = preferred_name(&resource.name);

        Some(Self {
            patient_id,
            patient_first_name: name.and_then(|n| n.first_given()).map(str::to_string),
            patient_last_name: name
                .and_then(|n| n.family.as_deref())
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .map(str::to_string),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fhir::{HumanName, Patient};

    #[test]
    fn roster_entry_uses_preferred_name() {
        let resource = Patient::parse_json(
            r#"{
                "resourceType": "Patient",
                "id": "abc",
                "name": [
                    { "use": "old", "given": ["Janet"], "family": "Smith" },
                    { "use": "official", "given": ["Jane", "Q"], "family": "Doe" }
                ]
            }"#,
        )
        .unwrap();

        let entry = SimplifiedPatient::from_resource(&resource).unwrap();
        assert_eq!(entry.patient_id, "abc");
        assert_eq!(entry.patient_first_name.as_deref(), Some("Jane"));
        assert_eq!(entry.patient_last_name.as_deref(), Some("Doe"));
    }

    #[test]
    fn roster_entry_requires_id() {
        let resource = PatientResource {
            resource_type: "Patient".into(),
            name: vec![HumanName {
                family: Some("Doe".into()),
                ..Default::default()
            }],
            ..Default::default()
        };
        assert!(SimplifiedPatient::from_resource(&resource).is_none());
    }

    #[tokio::test]
    async fn unconfigured_server_selects_demo_roster() {
        let cfg = CoreConfig::new("127.0.0.1:0".into(), None, 50, false).unwrap();
        let source = source_from_config(&cfg).unwrap();
        assert_eq!(source.list_patients(50).await.unwrap().len(), 8);
    }

    #[test]
    fn roster_entry_serialises_camel_case() {
        let entry = SimplifiedPatient {
            patient_id: "p".into(),
            patient_first_name: None,
            patient_last_name: Some("Doe".into()),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["patientId"], "p");
        assert_eq!(json["patientLastName"], "Doe");
        assert!(json.get("patientFirstName").is_none());
    }
}
