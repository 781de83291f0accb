//! FHIR `Patient` wire model and parsing helpers.
//!
//! Responsibilities:
//! - Define the wire model for the `Patient` elements the service reads
//! - Parse JSON (EHR responses) and YAML (operator fixtures) into that model
//! - Enforce `resourceType: Patient`
//!
//! Notes:
//! - Unknown elements are ignored; the EHR owns the schema
//! - Flattening into `PatientData` lives in `dority-core`

use crate::datatypes::{Address, CodeableConcept, ContactPoint, HumanName, Identifier, Reference};
use crate::{schema_mismatch, FhirError};
use serde::{Deserialize, Serialize};

/// Wire representation of a FHIR `Patient` resource.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PatientResource {
    pub resource_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identifier: Vec<Identifier>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub name: Vec<HumanName>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub telecom: Vec<ContactPoint>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub address: Vec<Address>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marital_status: Option<CodeableConcept>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contact: Vec<PatientContact>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub general_practitioner: Vec<Reference>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub managing_organization: Option<Reference>,
}

/// A contact party for the patient (`Patient.contact`): guardian, next of kin, pharmacy, etc.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PatientContact {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relationship: Vec<CodeableConcept>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<HumanName>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub telecom: Vec<ContactPoint>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<Reference>,
}

/// Patient resource operations.
///
/// Zero-sized type used for namespacing; all methods are associated functions.
pub struct Patient;

impl Patient {
    /// Parse a patient resource from FHIR JSON text.
    ///
    /// Uses `serde_path_to_error` to surface the failing element path (for example
    /// `telecom[0].rank`) when an element has an unexpected type.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError`] if:
    /// - the text is not JSON or an element has an unexpected type,
    /// - `resourceType` is not `Patient`.
    pub fn parse_json(json_text: &str) -> Result<PatientResource, FhirError> {
        let mut deserializer = serde_json::Deserializer::from_str(json_text);
        let wire: PatientResource = serde_path_to_error::deserialize(&mut deserializer)
            .map_err(|err| schema_mismatch("Patient", err))?;
        ensure_patient(wire)
    }

    /// Parse a patient resource from YAML text (used for operator fixtures).
    ///
    /// # Errors
    ///
    /// As for [`Patient::parse_json`].
    pub fn parse_yaml(yaml_text: &str) -> Result<PatientResource, FhirError> {
        let deserializer = serde_yaml::Deserializer::from_str(yaml_text);
        let wire: PatientResource = serde_path_to_error::deserialize(deserializer)
            .map_err(|err| schema_mismatch("Patient", err))?;
        ensure_patient(wire)
    }

    /// Interpret an already-decoded JSON value as a patient resource.
    ///
    /// # Errors
    ///
    /// As for [`Patient::parse_json`].
    pub fn from_value(value: serde_json::Value) -> Result<PatientResource, FhirError> {
        let wire: PatientResource = serde_path_to_error::deserialize(value)
            .map_err(|err| schema_mismatch("Patient", err))?;
        ensure_patient(wire)
    }

    /// Render a patient resource as pretty-printed FHIR JSON.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError::Translation`] if serialisation fails.
    pub fn render_json(resource: &PatientResource) -> Result<String, FhirError> {
        serde_json::to_string_pretty(resource)
            .map_err(|e| FhirError::Translation(format!("Failed to serialise patient: {e}")))
    }
}

fn ensure_patient(wire: PatientResource) -> Result<PatientResource, FhirError> {
    if wire.resource_type != "Patient" {
        return Err(FhirError::InvalidInput(format!(
            "Expected resourceType 'Patient', got '{}'",
            wire.resource_type
        )));
    }
    Ok(wire)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_PATIENT: &str = r#"{
        "resourceType": "Patient",
        "id": "patient-002",
        "meta": { "versionId": "3" },
        "identifier": [
            { "type": { "coding": [{ "code": "MR" }] }, "value": "MRN-88231" }
        ],
        "name": [{ "use": "official", "family": "Johnson", "given": ["Sarah", "Anne"] }],
        "telecom": [
            { "system": "phone", "value": "555-0102", "use": "home" },
            { "system": "email", "value": "sarah@example.org" }
        ],
        "gender": "female",
        "birthDate": "1985-07-14",
        "address": [{ "use": "home", "line": ["12 High St"], "city": "Leeds", "postalCode": "LS1 1AA" }],
        "maritalStatus": { "coding": [{ "code": "M", "display": "Married" }] },
        "contact": [
            {
                "relationship": [{ "coding": [{ "code": "C" }] }],
                "name": { "given": ["Tom"], "family": "Johnson" },
                "telecom": [{ "system": "phone", "value": "555-0199" }]
            }
        ],
        "generalPractitioner": [{ "reference": "Practitioner/9", "display": "Dr Amir Khan" }]
    }"#;

    #[test]
    fn parses_full_patient_and_ignores_unknown_elements() {
        let patient = Patient::parse_json(FULL_PATIENT).expect("parse json");
        assert_eq!(patient.id.as_deref(), Some("patient-002"));
        assert_eq!(patient.name[0].family.as_deref(), Some("Johnson"));
        assert_eq!(patient.telecom.len(), 2);
        assert_eq!(patient.address[0].postal_code.as_deref(), Some("LS1 1AA"));
        assert_eq!(patient.contact[0].telecom[0].value.as_deref(), Some("555-0199"));
        assert_eq!(
            patient.general_practitioner[0].display.as_deref(),
            Some("Dr Amir Khan")
        );
    }

    #[test]
    fn parses_minimal_patient() {
        let patient = Patient::parse_json(r#"{"resourceType":"Patient"}"#).expect("minimal");
        assert!(patient.id.is_none());
        assert!(patient.name.is_empty());
        assert!(patient.contact.is_empty());
    }

    #[test]
    fn rejects_other_resource_types() {
        let err = Patient::parse_json(r#"{"resourceType":"Practitioner","id":"9"}"#)
            .expect_err("should reject");
        match err {
            FhirError::InvalidInput(msg) => {
                assert!(msg.contains("Patient"));
                assert!(msg.contains("Practitioner"));
            }
            other => panic!("expected InvalidInput error, got {other:?}"),
        }
    }

    #[test]
    fn reports_path_of_wrongly_typed_element() {
        let input = r#"{"resourceType":"Patient","name":[{"given":"Jane"}]}"#;
        let err = Patient::parse_json(input).expect_err("should reject");
        match err {
            FhirError::Translation(msg) => assert!(msg.contains("name"), "{msg}"),
            other => panic!("expected Translation error, got {other:?}"),
        }
    }

    #[test]
    fn parses_yaml_fixture() {
        let input = r#"resourceType: Patient
id: patient-001
name:
  - family: Smith
    given:
      - John
birthDate: "1970-02-03"
"#;
        let patient = Patient::parse_yaml(input).expect("parse yaml");
        assert_eq!(patient.name[0].joined_parts().as_deref(), Some("John Smith"));
        assert_eq!(patient.birth_date.as_deref(), Some("1970-02-03"));
    }

    #[test]
    fn render_then_parse_preserves_resource() {
        let patient = Patient::parse_json(FULL_PATIENT).expect("parse json");
        let rendered = Patient::render_json(&patient).expect("render");
        assert!(rendered.contains("\"generalPractitioner\""));
        assert!(!rendered.contains("versionId"));
        assert_eq!(Patient::parse_json(&rendered).expect("reparse"), patient);
    }
}
