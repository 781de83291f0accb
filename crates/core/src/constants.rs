//! Constants used throughout the Dority core crate.
//!
//! Display fallbacks live here so the extractor, resolver and summary builder agree on the
//! exact strings the UI matches against.

/// Full name used when a patient resource carries no usable name.
pub const UNKNOWN_PATIENT_NAME: &str = "Unknown Patient";

/// Name used for a contact party with no name or organisation.
pub const UNKNOWN_CONTACT_NAME: &str = "Unknown";

/// Final fallback for resolved pharmacy / practitioner / insurance fields.
pub const NOT_SPECIFIED: &str = "Not specified";

/// Final fallback for the resolved patient address.
pub const NOT_PROVIDED: &str = "Not provided";

/// Placeholder shown until problems are loaded from the medical history.
pub const KEY_PROBLEMS_PLACEHOLDER: &str = "Loading from medical history...";

/// Placeholder shown until the medication list is loaded.
pub const CURRENT_MEDS_PLACEHOLDER: &str = "Loading from medication list...";

/// Closing line of every history summary.
pub const HISTORY_FOOTER: &str = "Note: Full medical history available in EMR";

/// Substring identifying a pharmacy contact (matched case-insensitively).
pub const PHARMACY_MARKER: &str = "pharm";

/// HL7 v2-0131 relationship codes that always denote an emergency contact.
pub const EMERGENCY_RELATIONSHIP_CODES: &[&str] = &["C", "N"];

/// Lowercase relationship phrases that denote an emergency contact.
pub const EMERGENCY_RELATIONSHIP_TERMS: &[&str] = &[
    "emergency",
    "next of kin",
    "next-of-kin",
    "guardian",
    "spouse",
    "partner",
    "parent",
    "family",
];

/// Default REST listen address.
pub const DEFAULT_REST_ADDR: &str = "0.0.0.0:3000";

/// Default upstream FHIR request timeout.
pub const DEFAULT_FHIR_TIMEOUT_SECS: u64 = 10;

/// Default and maximum number of patients returned by the roster listing.
pub const DEFAULT_PATIENT_LIST_LIMIT: usize = 50;
pub const MAX_PATIENT_LIST_LIMIT: usize = 500;

/// Sessions older than this are evicted from the in-memory store.
pub const DEFAULT_SESSION_MAX_AGE_SECS: u64 = 12 * 60 * 60;
