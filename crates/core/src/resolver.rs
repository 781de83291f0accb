//! Pharmacy, practitioner and address resolution.
//!
//! Each resolver walks a fixed fallback chain and stops at the first source with usable text.
//! The chain always runs from the most structured source (coded patient data) to the least
//! (caller override, then a display default), so two calls with the same inputs agree.

use crate::constants::{NOT_PROVIDED, NOT_SPECIFIED, PHARMACY_MARKER};
use crate::patient_data::PatientData;
use fhir::{PatientContact, PatientResource};
use serde::Serialize;
use utoipa::ToSchema;

/// Where a resolved value came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum ResolutionSource {
    /// A `Patient.contact` entry identified as a pharmacy.
    PharmacyContact,
    /// `Patient.generalPractitioner`.
    GeneralPractitioner,
    /// The patient's own structured address.
    PatientAddress,
    /// A value supplied by the caller with the request.
    CallerOverride,
    /// The display default ("Not specified" / "Not provided").
    Default,
}

/// A resolved display value together with its provenance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolved {
    pub value: String,
    pub source: ResolutionSource,
}

impl Resolved {
    fn new(value: impl Into<String>, source: ResolutionSource) -> Self {
        Self {
            value: value.into(),
            source,
        }
    }
}

fn contains_marker(text: Option<&str>) -> bool {
    text.is_some_and(|t| t.to_lowercase().contains(PHARMACY_MARKER))
}

/// True if a contact looks like a pharmacy.
///
/// Matches "pharm" (any case) in a relationship code, display or text, the organisation
/// display, or the contact name.
pub fn is_pharmacy_contact(contact: &PatientContact) -> bool {
    contact
        .relationship
        .iter()
        .any(|concept| concept.mentions(PHARMACY_MARKER))
        || contains_marker(contact.organization.as_ref().and_then(|o| o.display.as_deref()))
        || contact.name.as_ref().is_some_and(|name| {
            contains_marker(name.text.as_deref()) || contains_marker(name.joined_parts().as_deref())
        })
}

/// Display label for a pharmacy contact: organisation, then name parts, then name text.
fn pharmacy_label(contact: &PatientContact) -> Option<String> {
    contact
        .organization
        .as_ref()
        .and_then(|o| o.non_blank_display())
        .map(str::to_string)
        .or_else(|| contact.name.as_ref().and_then(|n| n.joined_parts()))
        .or_else(|| {
            contact
                .name
                .as_ref()
                .and_then(|n| n.text.as_deref())
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
        })
}

fn first_practitioner_display(resource: &PatientResource) -> Option<&str> {
    resource
        .general_practitioner
        .first()
        .and_then(|r| r.non_blank_display())
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Resolve the preferred pharmacy.
///
/// Chain: pharmacy contact → first general practitioner display → `fallback` →
/// "Not specified". A pharmacy contact with no usable label is skipped, not chosen.
pub fn resolve_pharmacy(resource: &PatientResource, fallback: Option<&str>) -> Resolved {
    if let Some(label) = resource
        .contact
        .iter()
        .filter(|c| is_pharmacy_contact(c))
        .find_map(pharmacy_label)
    {
        return Resolved::new(label, ResolutionSource::PharmacyContact);
    }

    if let Some(gp) = first_practitioner_display(resource) {
        return Resolved::new(gp, ResolutionSource::GeneralPractitioner);
    }

    match non_blank(fallback) {
        Some(value) => Resolved::new(value, ResolutionSource::CallerOverride),
        None => Resolved::new(NOT_SPECIFIED, ResolutionSource::Default),
    }
}

/// Resolve the general practitioner: first `generalPractitioner` display → `fallback` →
/// "Not specified".
pub fn resolve_general_practitioner(resource: &PatientResource, fallback: Option<&str>) -> Resolved {
    if let Some(gp) = first_practitioner_display(resource) {
        return Resolved::new(gp, ResolutionSource::GeneralPractitioner);
    }

    match non_blank(fallback) {
        Some(value) => Resolved::new(value, ResolutionSource::CallerOverride),
        None => Resolved::new(NOT_SPECIFIED, ResolutionSource::Default),
    }
}

/// Resolve the address: structured patient address → `override_value` → "Not provided".
pub fn resolve_address(patient: &PatientData, override_value: Option<&str>) -> Resolved {
    if let Some(address) = &patient.address {
        return Resolved::new(address.full.clone(), ResolutionSource::PatientAddress);
    }

    match non_blank(override_value) {
        Some(value) => Resolved::new(value, ResolutionSource::CallerOverride),
        None => Resolved::new(NOT_PROVIDED, ResolutionSource::Default),
    }
}
