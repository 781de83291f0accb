//! Search-set `Bundle` support.
//!
//! A `GET /Patient?...` search returns a `Bundle` whose entries may mix resource types
//! (`OperationOutcome` warnings, `_include`d resources). Only `Patient` entries are kept.

use crate::patient::{Patient, PatientResource};
use crate::{schema_mismatch, FhirError};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BundleWire {
    resource_type: String,
    #[serde(default)]
    entry: Vec<BundleEntryWire>,
}

#[derive(Debug, Deserialize)]
struct BundleEntryWire {
    #[serde(default)]
    resource: Option<serde_json::Value>,
}

/// Bundle operations.
pub struct Bundle;

impl Bundle {
    /// Parse a search-set bundle and return its `Patient` resources in entry order.
    ///
    /// Entries without a resource, or whose resource is not a `Patient`, are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError`] if the text is not a `Bundle` or a `Patient` entry is malformed.
    pub fn parse_patients(json_text: &str) -> Result<Vec<PatientResource>, FhirError> {
        let mut deserializer = serde_json::Deserializer::from_str(json_text);
        let wire: BundleWire = serde_path_to_error::deserialize(&mut deserializer)
            .map_err(|err| schema_mismatch("Bundle", err))?;

        if wire.resource_type != "Bundle" {
            return Err(FhirError::InvalidInput(format!(
                "Expected resourceType 'Bundle', got '{}'",
                wire.resource_type
            )));
        }

        wire.entry
            .into_iter()
            .filter_map(|entry| entry.resource)
            .filter(|resource| {
                resource.get("resourceType").and_then(|t| t.as_str()) == Some("Patient")
            })
            .map(Patient::from_value)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_only_patient_entries() {
        let input = r#"{
            "resourceType": "Bundle",
            "type": "searchset",
            "entry": [
                { "resource": { "resourceType": "Patient", "id": "a" } },
                { "resource": { "resourceType": "OperationOutcome", "issue": [] } },
                { "fullUrl": "urn:uuid:x" },
                { "resource": { "resourceType": "Patient", "id": "b" } }
            ]
        }"#;

        let patients = Bundle::parse_patients(input).expect("parse bundle");
        let ids: Vec<_> = patients.iter().filter_map(|p| p.id.as_deref()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn empty_bundle_has_no_patients() {
        let patients =
            Bundle::parse_patients(r#"{"resourceType":"Bundle","type":"searchset","total":0}"#)
                .expect("parse bundle");
        assert!(patients.is_empty());
    }

    #[test]
    fn rejects_non_bundle() {
        let err = Bundle::parse_patients(r#"{"resourceType":"Patient"}"#).expect_err("reject");
        assert!(matches!(err, FhirError::InvalidInput(_)));
    }
}
