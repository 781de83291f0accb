//! Patient data extraction.
//!
//! Flattens a heterogeneous FHIR `Patient` into [`PatientData`], the shape the session UI and
//! questionnaire autofill consume.
//!
//! Extraction is **total**: every optional element is handled, nothing here returns an error.
//! A field is either present with usable text or absent; blank strings never leak through.
//!
//! Age is computed against a caller-supplied `today` so results are reproducible.

use crate::constants::{
    EMERGENCY_RELATIONSHIP_CODES, EMERGENCY_RELATIONSHIP_TERMS, UNKNOWN_CONTACT_NAME,
    UNKNOWN_PATIENT_NAME,
};
use crate::resolver::is_pharmacy_contact;
use chrono::{Datelike, NaiveDate};
use fhir::{Address, CodeableConcept, ContactPoint, HumanName, PatientContact, PatientResource};
use serde::Serialize;
use utoipa::ToSchema;

/// Normalised patient record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatientData {
    pub id: String,
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub mrn: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    /// Whole years, derived from `date_of_birth`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marital_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<PostalAddress>,
    pub emergency_contacts: Vec<EmergencyContact>,
}

/// Structured postal address with a derived single-line form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostalAddress {
    pub line: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// Comma-joined lines, city, state, postal code and country.
    pub full: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyContact {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationship: Option<String>,
}

/// Flatten `resource` into [`PatientData`], computing age as of `today`.
pub fn extract_patient_data(resource: &PatientResource, today: NaiveDate) -> PatientData {
    let name = preferred_name(&resource.name);
    let date_of_birth = non_blank(resource.birth_date.as_deref());
    let age = date_of_birth
        .as_deref()
        .and_then(parse_full_date)
        .and_then(|dob| age_on(dob, today));

    let phones = ranked(&resource.telecom, "phone");
    let mobile_phone = phones
        .iter()
        .find(|cp| cp.is_use("mobile"))
        .and_then(|cp| cp.non_blank_value())
        .map(str::to_string);
    let primary_phone = primary_phone(&phones);
    let email = ranked(&resource.telecom, "email")
        .first()
        .and_then(|cp| cp.non_blank_value())
        .map(str::to_string);

    PatientData {
        id: resource.id.clone().unwrap_or_default(),
        full_name: name
            .and_then(display_name)
            .unwrap_or_else(|| UNKNOWN_PATIENT_NAME.to_string()),
        first_name: name.and_then(|n| n.first_given()).map(str::to_string),
        last_name: name.and_then(|n| non_blank(n.family.as_deref())),
        mrn: medical_record_number(resource),
        date_of_birth,
        age,
        gender: non_blank(resource.gender.as_deref()),
        marital_status: resource.marital_status.as_ref().and_then(marital_status_label),
        primary_phone,
        mobile_phone,
        email,
        address: preferred_address(&resource.address).and_then(postal_address),
        emergency_contacts: resource
            .contact
            .iter()
            .filter(|c| is_emergency_contact(c))
            .map(emergency_contact)
            .collect(),
    }
}

/// Pick the name to display: `official`, then `usual`, then any other; `old` names last.
///
/// Names with neither parts nor text are skipped.
pub fn preferred_name(names: &[HumanName]) -> Option<&HumanName> {
    fn priority(name: &HumanName) -> u8 {
        match name.use_type.as_deref().map(str::to_ascii_lowercase).as_deref() {
            Some("official") => 0,
            Some("usual") => 1,
            Some("old") | Some("maiden") => 3,
            _ => 2,
        }
    }

    let mut candidates: Vec<&HumanName> = names
        .iter()
        .filter(|n| display_name(n).is_some())
        .collect();
    candidates.sort_by_key(|n| priority(n));
    candidates.into_iter().next()
}

fn display_name(name: &HumanName) -> Option<String> {
    name.joined_parts()
        .or_else(|| non_blank(name.text.as_deref()))
}

/// Whole years from `dob` to `today`; `None` if `dob` is in the future.
pub fn age_on(dob: NaiveDate, today: NaiveDate) -> Option<u32> {
    if dob > today {
        return None;
    }
    let mut years = today.year() - dob.year();
    if (today.month(), today.day()) < (dob.month(), dob.day()) {
        years -= 1;
    }
    u32::try_from(years).ok()
}

/// Parse a FHIR `date` only when it has full day precision.
fn parse_full_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

fn medical_record_number(resource: &PatientResource) -> String {
    let is_mrn_type = |concept: &CodeableConcept| {
        concept.has_code("MR") || concept.mentions("medical record") || concept.mentions("mrn")
    };

    resource
        .identifier
        .iter()
        .filter(|i| i.type_concept.as_ref().is_some_and(is_mrn_type))
        .chain(resource.identifier.iter())
        .find_map(|i| i.non_blank_value())
        .map(str::to_string)
        .or_else(|| resource.id.clone())
        .unwrap_or_default()
}

/// Contact points of `system`, stable-sorted by `rank` (unranked last), blanks dropped.
fn ranked<'a>(telecom: &'a [ContactPoint], system: &str) -> Vec<&'a ContactPoint> {
    let mut points: Vec<&ContactPoint> = telecom
        .iter()
        .filter(|cp| cp.is_system(system) && cp.non_blank_value().is_some())
        .collect();
    points.sort_by_key(|cp| cp.rank.unwrap_or(u32::MAX));
    points
}

fn primary_phone(phones: &[&ContactPoint]) -> Option<String> {
    let landlines: Vec<&ContactPoint> = phones
        .iter()
        .copied()
        .filter(|cp| !cp.is_use("mobile"))
        .collect();
    landlines
        .iter()
        .find(|cp| cp.is_use("home"))
        .or_else(|| landlines.iter().find(|cp| cp.is_use("work")))
        .or_else(|| landlines.first())
        .and_then(|cp| cp.non_blank_value())
        .map(str::to_string)
}

/// `home` first, then any current address, then an `old` one. Entries with no text are skipped.
fn preferred_address(addresses: &[Address]) -> Option<&Address> {
    let usable = || addresses.iter().filter(|a| postal_address(a).is_some());
    usable()
        .find(|a| a.is_use("home"))
        .or_else(|| usable().find(|a| !a.is_use("old")))
        .or_else(|| usable().next())
}

/// Build the structured address; `None` when no segment carries text.
pub fn postal_address(address: &Address) -> Option<PostalAddress> {
    let line: Vec<String> = address
        .line
        .iter()
        .filter_map(|l| non_blank(Some(l.as_str())))
        .collect();
    let city = non_blank(address.city.as_deref());
    let state = non_blank(address.state.as_deref());
    let postal_code = non_blank(address.postal_code.as_deref());
    let country = non_blank(address.country.as_deref());

    let segments: Vec<&str> = line
        .iter()
        .map(String::as_str)
        .chain(city.as_deref())
        .chain(state.as_deref())
        .chain(postal_code.as_deref())
        .chain(country.as_deref())
        .collect();

    let full = if segments.is_empty() {
        non_blank(address.text.as_deref())?
    } else {
        segments.join(", ")
    };

    Some(PostalAddress {
        line,
        city,
        state,
        postal_code,
        country,
        full,
    })
}

fn marital_status_label(concept: &CodeableConcept) -> Option<String> {
    if let Some(text) = concept.non_blank_text().or_else(|| concept.first_display()) {
        return Some(text.to_string());
    }
    let code = concept.first_code()?;
    let label = match code.to_ascii_uppercase().as_str() {
        "A" => "Annulled",
        "C" => "Common Law",
        "D" => "Divorced",
        "I" => "Interlocutory",
        "L" => "Legally Separated",
        "M" => "Married",
        "P" => "Polygamous",
        "S" => "Never Married",
        "T" => "Domestic partner",
        "U" => "Unmarried",
        "W" => "Widowed",
        "UNK" => "Unknown",
        _ => code,
    };
    Some(label.to_string())
}

/// True if a contact's relationship matches the emergency vocabulary.
///
/// Pharmacy contacts never count, whatever else their relationship says.
pub fn is_emergency_contact(contact: &PatientContact) -> bool {
    if is_pharmacy_contact(contact) {
        return false;
    }
    contact.relationship.iter().any(|concept| {
        EMERGENCY_RELATIONSHIP_CODES
            .iter()
            .any(|code| concept.has_code(code))
            || EMERGENCY_RELATIONSHIP_TERMS
                .iter()
                .any(|term| concept.mentions(term))
    })
}

fn emergency_contact(contact: &PatientContact) -> EmergencyContact {
    let name = contact
        .name
        .as_ref()
        .and_then(display_name)
        .or_else(|| {
            contact
                .organization
                .as_ref()
                .and_then(|o| o.non_blank_display())
                .map(str::to_string)
        })
        .unwrap_or_else(|| UNKNOWN_CONTACT_NAME.to_string());

    let phone = ranked(&contact.telecom, "phone")
        .first()
        .and_then(|cp| cp.non_blank_value())
        .map(str::to_string);

    let relationship = contact.relationship.iter().find_map(|concept| {
        concept
            .first_display()
            .or_else(|| concept.non_blank_text())
            .or_else(|| concept.first_code())
            .map(str::to_string)
    });

    EmergencyContact {
        name,
        phone,
        relationship,
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
