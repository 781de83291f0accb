//! Session-facing patient summary and the plain-text history block.

use crate::constants::{
    CURRENT_MEDS_PLACEHOLDER, HISTORY_FOOTER, KEY_PROBLEMS_PLACEHOLDER, NOT_SPECIFIED,
};
use crate::patient_data::PatientData;
use crate::resolver::Resolved;
use serde::Serialize;
use utoipa::ToSchema;

/// The subset of patient data a session works from, plus autofill duplicates.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatientSummary {
    pub id: String,
    pub name: String,
    pub mrn: String,
    pub dob: String,
    pub key_problems: String,
    pub current_meds: String,
    pub allergies: Vec<String>,
    pub preferred_pharmacy: String,
    pub general_practitioner: String,
    pub patient_address: String,
    pub insurance: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_contact_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_contact_phone: Option<String>,
}

/// Resolved values that feed a [`PatientSummary`].
#[derive(Clone, Debug)]
pub struct ResolvedFields {
    pub pharmacy: Resolved,
    pub general_practitioner: Resolved,
    pub address: Resolved,
}

impl PatientSummary {
    pub fn build(data: &PatientData, resolved: &ResolvedFields) -> Self {
        let first_contact = data.emergency_contacts.first();

        Self {
            id: data.id.clone(),
            name: data.full_name.clone(),
            mrn: data.mrn.clone(),
            dob: data.date_of_birth.clone().unwrap_or_default(),
            key_problems: KEY_PROBLEMS_PLACEHOLDER.to_string(),
            current_meds: CURRENT_MEDS_PLACEHOLDER.to_string(),
            allergies: Vec::new(),
            preferred_pharmacy: resolved.pharmacy.value.clone(),
            general_practitioner: resolved.general_practitioner.value.clone(),
            patient_address: resolved.address.value.clone(),
            insurance: NOT_SPECIFIED.to_string(),
            gender: data.gender.clone(),
            age: data.age,
            phone: data
                .primary_phone
                .clone()
                .or_else(|| data.mobile_phone.clone()),
            email: data.email.clone(),
            address: data.address.as_ref().map(|a| a.full.clone()),
            emergency_contact_name: first_contact.map(|c| c.name.clone()),
            emergency_contact_phone: first_contact.and_then(|c| c.phone.clone()),
        }
    }
}

/// Render the multi-line history block shown at the top of a session.
///
/// Lines appear in a fixed order; lines for absent fields are dropped rather than left blank.
pub fn history_summary(data: &PatientData) -> String {
    let optional = |label: &str, value: Option<&str>| value.map(|v| format!("{label}: {v}"));

    let emergency = data.emergency_contacts.first().map(|c| match &c.phone {
        Some(phone) => format!("Emergency Contact: {} ({phone})", c.name),
        None => format!("Emergency Contact: {}", c.name),
    });

    let lines = [
        Some(format!("Patient: {}", data.full_name)),
        data.age.map(|age| format!("Age: {age} years")),
        Some(format!(
            "Date of Birth: {}",
            data.date_of_birth.as_deref().unwrap_or("Unknown")
        )),
        Some(format!("MRN: {}", data.mrn)),
        optional("Gender", data.gender.as_deref()),
        optional("Marital Status", data.marital_status.as_deref()),
        optional("Phone", data.primary_phone.as_deref()),
        optional("Email", data.email.as_deref()),
        optional("Address", data.address.as_ref().map(|a| a.full.as_str())),
        emergency,
        Some(HISTORY_FOOTER.to_string()),
    ];

    lines
        .into_iter()
        .flatten()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patient_data::{EmergencyContact, PostalAddress};
    use crate::resolver::ResolutionSource;

    fn minimal() -> PatientData {
        PatientData {
            id: "p-1".into(),
            full_name: "Jane Doe".into(),
            first_name: Some("Jane".into()),
            last_name: Some("Doe".into()),
            mrn: "MRN-77".into(),
            date_of_birth: None,
            age: None,
            gender: None,
            marital_status: None,
            primary_phone: None,
            mobile_phone: None,
            email: None,
            address: None,
            emergency_contacts: Vec::new(),
        }
    }

    fn resolved(value: &str, source: ResolutionSource) -> Resolved {
        Resolved {
            value: value.into(),
            source,
        }
    }

    #[test]
    fn history_omits_absent_fields() {
        let summary = history_summary(&minimal());
        assert_eq!(
            summary,
            "Patient: Jane Doe\n\
             Date of Birth: Unknown\n\
             MRN: MRN-77\n\
             Note: Full medical history available in EMR"
        );
    }

    #[test]
    fn history_includes_every_populated_line_in_order() {
        let mut data = minimal();
        data.date_of_birth = Some("1990-01-01".into());
        data.age = Some(36);
        data.gender = Some("female".into());
        data.marital_status = Some("Married".into());
        data.primary_phone = Some("0113 496 0123".into());
        data.mobile_phone = Some("07700 900123".into());
        data.email = Some("jane@example.org".into());
        data.address = Some(PostalAddress {
            line: vec!["1 High St".into()],
            city: Some("Leeds".into()),
            state: None,
            postal_code: None,
            country: None,
            full: "1 High St, Leeds".into(),
        });
        data.emergency_contacts = vec![EmergencyContact {
            name: "John Doe".into(),
            phone: Some("0113 496 0000".into()),
            relationship: Some("Spouse".into()),
        }];

        let lines: Vec<String> = history_summary(&data).lines().map(String::from).collect();
        assert_eq!(
            lines,
            vec![
                "Patient: Jane Doe",
                "Age: 36 years",
                "Date of Birth: 1990-01-01",
                "MRN: MRN-77",
                "Gender: female",
                "Marital Status: Married",
                "Phone: 0113 496 0123",
                "Email: jane@example.org",
                "Address: 1 High St, Leeds",
                "Emergency Contact: John Doe (0113 496 0000)",
                "Note: Full medical history available in EMR",
            ]
        );
    }

    #[test]
    fn mobile_only_patient_has_no_phone_line() {
        let mut data = minimal();
        data.mobile_phone = Some("07700 900123".into());
        assert!(!history_summary(&data).contains("Phone:"));
    }

    #[test]
    fn newborn_age_is_printed() {
        let mut data = minimal();
        data.age = Some(0);
        assert!(history_summary(&data).contains("Age: 0 years"));
    }

    #[test]
    fn emergency_contact_without_phone_has_no_parentheses() {
        let mut data = minimal();
        data.emergency_contacts = vec![EmergencyContact {
            name: "Sam Doe".into(),
            phone: None,
            relationship: None,
        }];
        assert!(history_summary(&data).contains("Emergency Contact: Sam Doe\n"));
    }

    #[test]
    fn summary_uses_placeholders_and_resolved_values() {
        let mut data = minimal();
        data.mobile_phone = Some("07700 900123".into());
        let fields = ResolvedFields {
            pharmacy: resolved("Boots", ResolutionSource::PharmacyContact),
            general_practitioner: resolved(NOT_SPECIFIED, ResolutionSource::Default),
            address: resolved("Not provided", ResolutionSource::Default),
        };

        let summary = PatientSummary::build(&data, &fields);
        assert_eq!(summary.key_problems, KEY_PROBLEMS_PLACEHOLDER);
        assert_eq!(summary.current_meds, CURRENT_MEDS_PLACEHOLDER);
        assert!(summary.allergies.is_empty());
        assert_eq!(summary.preferred_pharmacy, "Boots");
        assert_eq!(summary.patient_address, "Not provided");
        assert_eq!(summary.insurance, NOT_SPECIFIED);
        assert_eq!(summary.phone.as_deref(), Some("07700 900123"));
        assert_eq!(summary.dob, "");
        assert!(summary.address.is_none());
    }

    #[test]
    fn summary_serialises_camel_case() {
        let fields = ResolvedFields {
            pharmacy: resolved(NOT_SPECIFIED, ResolutionSource::Default),
            general_practitioner: resolved(NOT_SPECIFIED, ResolutionSource::Default),
            address: resolved("Not provided", ResolutionSource::Default),
        };
        let json = serde_json::to_value(PatientSummary::build(&minimal(), &fields)).unwrap();
        assert_eq!(json["preferredPharmacy"], "Not specified");
        assert_eq!(json["keyProblems"], KEY_PROBLEMS_PLACEHOLDER);
        assert!(json.get("emergencyContactName").is_none());
    }
}
