//! Session start orchestration.
//!
//! `start` runs fetch → extract → resolve → assemble, registers the session in the shared
//! [`SessionStore`], and returns everything the client needs to render the session header.

use crate::actions::SessionStore;
use crate::config::CoreConfig;
use crate::error::{ActionError, SessionError, SessionResult};
use crate::patient_data::{extract_patient_data, PatientData};
use crate::resolver::{resolve_address, resolve_general_practitioner, resolve_pharmacy};
use crate::source::{PatientSource, SimplifiedPatient};
use crate::summary::{history_summary, PatientSummary, ResolvedFields};
use chrono::NaiveDate;
use dority_types::ResourceId;
use dority_uuid::SessionId;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

const SESSION_ID_ATTEMPTS: u32 = 3;

/// Values the clinician picked in the patient selector, used where the record is silent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct PatientSelection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_pharmacy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub general_practitioner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

#[derive(Clone, Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionStarted {
    #[schema(value_type = String, example = "session-1760870400000-k3j9x0a2q")]
    pub session_id: SessionId,
    pub patient: PatientSummary,
    pub patient_data: PatientData,
    pub history_summary: String,
}

/// Starts sessions and lists the roster.
#[derive(Clone)]
pub struct SessionService {
    cfg: Arc<CoreConfig>,
    source: Arc<dyn PatientSource>,
    store: Arc<SessionStore>,
}

impl SessionService {
    pub fn new(
        cfg: Arc<CoreConfig>,
        source: Arc<dyn PatientSource>,
        store: Arc<SessionStore>,
    ) -> Self {
        Self { cfg, source, store }
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Start a session for `patient_id`, computing ages as of `today`.
    ///
    /// # Errors
    ///
    /// - [`SessionError::InvalidInput`] if the id is missing, blank or not a FHIR logical id.
    ///   The source is not contacted in that case.
    /// - [`SessionError::NotFound`] if the source has no such patient.
    /// - [`SessionError::Source`] for any other fetch failure.
    pub async fn start(
        &self,
        patient_id: Option<&str>,
        selection: Option<&PatientSelection>,
        today: NaiveDate,
    ) -> SessionResult<SessionStarted> {
        let requested = patient_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| SessionError::InvalidInput("Patient ID is required".into()))?;
        let id = ResourceId::parse(requested)
            .map_err(|e| SessionError::InvalidInput(format!("Invalid patient ID: {e}")))?;

        let resource = self.source.read_patient(&id).await?;

        let mut patient_data = extract_patient_data(&resource, today);
        if patient_data.id.is_empty() {
            patient_data.id = id.to_string();
        }

        let selection = selection.cloned().unwrap_or_default();
        let resolved = ResolvedFields {
            pharmacy: resolve_pharmacy(&resource, selection.preferred_pharmacy.as_deref()),
            general_practitioner: resolve_general_practitioner(
                &resource,
                selection.general_practitioner.as_deref(),
            ),
            address: resolve_address(&patient_data, selection.address.as_deref()),
        };

        tracing::info!(
            patient_id = %patient_data.id,
            has_name = patient_data.first_name.is_some() || patient_data.last_name.is_some(),
            has_phone = patient_data.primary_phone.is_some(),
            has_email = patient_data.email.is_some(),
            has_address = patient_data.address.is_some(),
            emergency_contacts = patient_data.emergency_contacts.len(),
            pharmacy_source = ?resolved.pharmacy.source,
            "extracted patient data"
        );

        let patient = PatientSummary::build(&patient_data, &resolved);
        let history_summary = history_summary(&patient_data);

        let session_id = self.register_session(&patient_data.id)?;
        tracing::info!(session_id = %session_id, patient_id = %patient_data.id, "session started");

        Ok(SessionStarted {
            session_id,
            patient,
            patient_data,
            history_summary,
        })
    }

    /// Register a fresh session id, regenerating it if it is already taken.
    fn register_session(&self, patient_id: &str) -> SessionResult<SessionId> {
        let mut attempt = 1;
        loop {
            let id = SessionId::generate();
            match self.store.create_session(id.clone(), patient_id) {
                Ok(()) => return Ok(id),
                Err(ActionError::DuplicateSession(_)) if attempt < SESSION_ID_ATTEMPTS => {
                    tracing::warn!(session_id = %id, attempt, "session id collision; regenerating");
                    attempt += 1;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// End a session and drop its actions.
    pub fn end(&self, session_id: &SessionId) -> SessionResult<()> {
        Ok(self.store.end_session(session_id)?)
    }

    /// The roster, limited to the configured size.
    pub async fn list_patients(&self) -> SessionResult<Vec<SimplifiedPatient>> {
        let limit = self.cfg.patient_list_limit();
        let patients = self.source.list_patients(limit).await?;
        tracing::debug!(count = patients.len(), limit, "listed patients");
        Ok(patients)
    }
}
