use crate::actions::ActionStatus;

/// Failures reported by a [`PatientSource`](crate::source::PatientSource).
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("patient not found: {0}")]
    NotFound(String),
    #[error("patient source request failed: {0}")]
    Upstream(String),
    #[error("patient source returned an invalid resource: {0}")]
    InvalidResponse(#[from] fhir::FhirError),
    #[error("failed to build FHIR HTTP client: {0}")]
    ClientBuild(String),
}

/// Failures while starting a session or listing patients.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("patient not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Source(SourceError),
    #[error("session store error: {0}")]
    Store(#[from] ActionError),
}

impl From<SourceError> for SessionError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::NotFound(id) => SessionError::NotFound(id),
            other => SessionError::Source(other),
        }
    }
}

/// Failures while reading or mutating suggested actions.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("invalid action: {0}")]
    InvalidInput(String),
    #[error("session not found: {0}")]
    SessionNotFound(String),
    #[error("session id already in use: {0}")]
    DuplicateSession(String),
    #[error("action not found: {0}")]
    ActionNotFound(String),
    #[error("action already {current}; decisions are final")]
    AlreadyDecided { current: ActionStatus },
    #[error("session store lock poisoned")]
    LockPoisoned,
}

/// Invalid startup configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: &'static str, message: String },
}

pub type SessionResult<T> = std::result::Result<T, SessionError>;
pub type ActionResult<T> = std::result::Result<T, ActionError>;
