use super::{PatientSource, SimplifiedPatient};
use crate::config::FhirServerConfig;
use crate::error::SourceError;
use async_trait::async_trait;
use dority_types::ResourceId;
use fhir::{Bundle, Patient, PatientResource};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::StatusCode;

const FHIR_JSON: &str = "application/fhir+json";

/// [`PatientSource`] backed by a FHIR R4 REST server.
#[derive(Clone, Debug)]
pub struct FhirHttpSource {
    client: reqwest::Client,
    base_url: String,
}

impl FhirHttpSource {
    /// Build a client with the configured timeout and optional bearer token.
    ///
    /// # Errors
    ///
    /// [`SourceError::ClientBuild`] if the token is not a valid header value or the TLS
    /// backend fails to initialise.
    pub fn new(config: &FhirServerConfig) -> Result<Self, SourceError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(FHIR_JSON));
        if let Some(token) = config.access_token() {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| SourceError::ClientBuild(format!("invalid access token: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .default_headers(headers)
            .build()
            .map_err(|e| SourceError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url().to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_text(&self, url: &str, what: &str) -> Result<(StatusCode, String), SourceError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SourceError::Upstream(format!("{what} request failed: {e}")))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SourceError::Upstream(format!("{what} response unreadable: {e}")))?;
        Ok((status, body))
    }
}

#[async_trait]
impl PatientSource for FhirHttpSource {
    async fn read_patient(&self, id: &ResourceId) -> Result<PatientResource, SourceError> {
        let url = format!("{}/Patient/{}", self.base_url, id);
        tracing::debug!(patient_id = %id, "reading patient from FHIR server");

        let (status, body) = self.get_text(&url, "Patient read").await?;
        match status {
            StatusCode::NOT_FOUND | StatusCode::GONE => Err(SourceError::NotFound(id.to_string())),
            s if s.is_success() => Ok(Patient::parse_json(&body)?),
            s => Err(SourceError::Upstream(format!(
                "Patient read returned HTTP {}",
                s.as_u16()
            ))),
        }
    }

    async fn list_patients(&self, limit: usize) -> Result<Vec<SimplifiedPatient>, SourceError> {
        let url = format!("{}/Patient?_count={limit}", self.base_url);
        tracing::debug!(limit, "searching patients on FHIR server");

        let (status, body) = self.get_text(&url, "Patient search").await?;
        if !status.is_success() {
            return Err(SourceError::Upstream(format!(
                "Patient search returned HTTP {}",
                status.as_u16()
            )));
        }

        Ok(Bundle::parse_patients(&body)?
            .iter()
            .filter_map(SimplifiedPatient::from_resource)
            .take(limit)
            .collect())
    }
}
