//! FHIR R4 wire support for the Dority session service.
//!
//! This crate provides **wire models** for the subset of FHIR the service reads from an EHR:
//! - `Patient` resources (names, telecom, addresses, contacts, practitioner references)
//! - search-set `Bundle`s of patients
//!
//! Unlike a storage format, these payloads are produced by someone else's server, so the models
//! are lenient: elements the service does not read are ignored rather than rejected. Type
//! mismatches in the elements it *does* read are reported with the failing path.
//!
//! Flattening into UI-friendly summaries happens in `dority-core`, not here.

pub mod bundle;
pub mod datatypes;
pub mod patient;

pub use bundle::Bundle;
pub use datatypes::{Address, CodeableConcept, Coding, ContactPoint, HumanName, Identifier, Reference};
pub use patient::{Patient, PatientContact, PatientResource};

/// Errors returned by the `fhir` boundary crate.
#[derive(Debug, thiserror::Error)]
pub enum FhirError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("translation error: {0}")]
    Translation(String),
}

/// Type alias for Results that can fail with a [`FhirError`].
pub type FhirResult<T> = Result<T, FhirError>;

/// Formats a `serde_path_to_error` failure as a [`FhirError::Translation`].
pub(crate) fn schema_mismatch<E: std::fmt::Display>(
    what: &str,
    err: serde_path_to_error::Error<E>,
) -> FhirError {
    let path = err.path().to_string();
    let source = err.into_inner();
    let path = if path.is_empty() || path == "." {
        "<root>"
    } else {
        path.as_str()
    };
    FhirError::Translation(format!("{what} schema mismatch at {path}: {source}"))
}
