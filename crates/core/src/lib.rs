//! # Dority Core
//!
//! Core logic for the Dority clinical session service:
//! - Flattening FHIR `Patient` resources into [`PatientData`]
//! - Resolving preferred pharmacy, practitioner and address
//! - Starting sessions and building the history summary
//! - The suggested-action lifecycle and its in-memory [`SessionStore`]
//! - [`PatientSource`] implementations (FHIR REST server, demo fixtures)
//!
//! **No API concerns**: HTTP routing and response envelopes belong in `api-rest` and
//! `api-shared`.

pub mod actions;
pub mod config;
pub mod constants;
pub mod error;
pub mod patient_data;
pub mod resolver;
pub mod session;
pub mod source;
pub mod summary;

pub use actions::{
    completion_percentage, ActionCard, ActionStatus, ActionType, Decision, NewAction,
    SafetyLevel, SessionStore, SuggestedAction,
};
pub use config::{CoreConfig, FhirServerConfig};
pub use error::{
    ActionError, ActionResult, ConfigError, SessionError, SessionResult, SourceError,
};
pub use patient_data::{extract_patient_data, EmergencyContact, PatientData, PostalAddress};
pub use resolver::{ResolutionSource, Resolved};
pub use session::{PatientSelection, SessionService, SessionStarted};
pub use source::{
    source_from_config, FhirHttpSource, FixtureSource, PatientSource, SimplifiedPatient,
};
pub use summary::{history_summary, PatientSummary};

pub use dority_types::ResourceId;
pub use dority_uuid::{ActionId, SessionId};
