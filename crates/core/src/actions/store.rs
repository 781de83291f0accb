//! In-memory session store.
//!
//! Holds every open session and its suggested actions. The store is shared by `Arc` between the
//! session service and the HTTP handlers; each operation takes the lock for one map access only.
//!
//! Sessions end explicitly via [`SessionStore::end_session`]. Any session older than the store's
//! maximum age is dropped the next time a session is created.

use super::{Decision, NewAction, SuggestedAction};
use crate::constants::DEFAULT_SESSION_MAX_AGE_SECS;
use crate::error::{ActionError, ActionResult};
use chrono::{DateTime, Utc};
use dority_uuid::{ActionId, SessionId};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

#[derive(Debug)]
struct SessionRecord {
    patient_id: String,
    actions: Vec<SuggestedAction>,
}

#[derive(Debug)]
pub struct SessionStore {
    sessions: RwLock<HashMap<SessionId, SessionRecord>>,
    max_age: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_max_age(Duration::from_secs(DEFAULT_SESSION_MAX_AGE_SECS))
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_age(max_age: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_age,
        }
    }

    fn read(&self) -> ActionResult<RwLockReadGuard<'_, HashMap<SessionId, SessionRecord>>> {
        self.sessions.read().map_err(|_| ActionError::LockPoisoned)
    }

    fn write(&self) -> ActionResult<RwLockWriteGuard<'_, HashMap<SessionId, SessionRecord>>> {
        self.sessions.write().map_err(|_| ActionError::LockPoisoned)
    }

    /// Register a new, empty session for `patient_id`, evicting expired sessions first.
    ///
    /// # Errors
    ///
    /// [`ActionError::DuplicateSession`] if the id is already registered.
    pub fn create_session(&self, id: SessionId, patient_id: &str) -> ActionResult<()> {
        let mut sessions = self.write()?;
        if let Some(cutoff) = self.cutoff(Utc::now()) {
            evict(&mut sessions, cutoff);
        }
        if sessions.contains_key(&id) {
            return Err(ActionError::DuplicateSession(id.to_string()));
        }
        sessions.insert(
            id,
            SessionRecord {
                patient_id: patient_id.to_string(),
                actions: Vec::new(),
            },
        );
        Ok(())
    }

    /// Drop a session and all of its actions.
    pub fn end_session(&self, id: &SessionId) -> ActionResult<()> {
        let removed = self.write()?.remove(id);
        match removed {
            Some(record) => {
                tracing::info!(
                    session_id = %id,
                    patient_id = %record.patient_id,
                    actions = record.actions.len(),
                    "session ended"
                );
                Ok(())
            }
            None => Err(ActionError::SessionNotFound(id.to_string())),
        }
    }

    /// Drop every session created before `cutoff`; returns how many were removed.
    pub fn evict_created_before(&self, cutoff: DateTime<Utc>) -> ActionResult<usize> {
        Ok(evict(&mut *self.write()?, cutoff))
    }

    fn cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        chrono::Duration::from_std(self.max_age)
            .ok()
            .and_then(|age| now.checked_sub_signed(age))
    }

    pub fn patient_id(&self, id: &SessionId) -> ActionResult<String> {
        self.read()?
            .get(id)
            .map(|record| record.patient_id.clone())
            .ok_or_else(|| ActionError::SessionNotFound(id.to_string()))
    }

    pub fn session_count(&self) -> ActionResult<usize> {
        Ok(self.read()?.len())
    }

    /// Validate `input` and append it to the session as a pending action.
    pub fn add_action(&self, session: &SessionId, input: NewAction) -> ActionResult<SuggestedAction> {
        let action = SuggestedAction::new(input)?;
        let mut sessions = self.write()?;
        let record = sessions
            .get_mut(session)
            .ok_or_else(|| ActionError::SessionNotFound(session.to_string()))?;
        record.actions.push(action.clone());
        Ok(action)
    }

    /// Actions of a session, in the order they were added.
    pub fn list_actions(&self, session: &SessionId) -> ActionResult<Vec<SuggestedAction>> {
        self.read()?
            .get(session)
            .map(|record| record.actions.clone())
            .ok_or_else(|| ActionError::SessionNotFound(session.to_string()))
    }

    /// Apply a decision to one action and return its new state.
    ///
    /// # Errors
    ///
    /// - [`ActionError::SessionNotFound`] / [`ActionError::ActionNotFound`] for unknown ids
    /// - [`ActionError::AlreadyDecided`] if the action is no longer pending
    pub fn update_action_status(
        &self,
        session: &SessionId,
        action_id: &ActionId,
        decision: Decision,
    ) -> ActionResult<SuggestedAction> {
        let mut sessions = self.write()?;
        let record = sessions
            .get_mut(session)
            .ok_or_else(|| ActionError::SessionNotFound(session.to_string()))?;
        let action = record
            .actions
            .iter_mut()
            .find(|a| a.id == *action_id)
            .ok_or_else(|| ActionError::ActionNotFound(action_id.to_string()))?;

        action.decide(decision)?;
        tracing::info!(
            session_id = %session,
            action_id = %action_id,
            status = %action.status,
            "action decided"
        );
        Ok(action.clone())
    }
}

fn evict(sessions: &mut HashMap<SessionId, SessionRecord>, cutoff: DateTime<Utc>) -> usize {
    let before = sessions.len();
    sessions.retain(|id, _| id.created_at().is_some_and(|created| created >= cutoff));
    let evicted = before - sessions.len();
    if evicted > 0 {
        tracing::info!(evicted, "evicted expired sessions");
    }
    evicted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::tests::full_action;
    use crate::actions::ActionStatus;

    fn store_with_session() -> (SessionStore, SessionId) {
        let store = SessionStore::new();
        let id = SessionId::generate();
        store.create_session(id.clone(), "patient-001").unwrap();
        (store, id)
    }

    #[test]
    fn create_session_rejects_duplicates() {
        let (store, id) = store_with_session();
        assert!(matches!(
            store.create_session(id.clone(), "patient-002"),
            Err(ActionError::DuplicateSession(_))
        ));
        assert_eq!(store.patient_id(&id).unwrap(), "patient-001");
        assert_eq!(store.session_count().unwrap(), 1);
    }

    #[test]
    fn actions_keep_insertion_order() {
        let (store, id) = store_with_session();
        let first = store.add_action(&id, full_action()).unwrap();
        let mut second_input = full_action();
        second_input.title = "Second".into();
        let second = store.add_action(&id, second_input).unwrap();

        let ids: Vec<_> = store.list_actions(&id).unwrap().iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }

    #[test]
    fn decision_is_persisted_and_final() {
        let (store, id) = store_with_session();
        let action = store.add_action(&id, full_action()).unwrap();

        let updated = store
            .update_action_status(&id, &action.id, Decision::Approve)
            .unwrap();
        assert_eq!(updated.status, ActionStatus::Approved);
        assert_eq!(updated.fhir_preview.status, "active");

        let err = store
            .update_action_status(&id, &action.id, Decision::Reject)
            .unwrap_err();
        assert!(matches!(
            err,
            ActionError::AlreadyDecided {
                current: ActionStatus::Approved
            }
        ));
        assert_eq!(store.list_actions(&id).unwrap()[0].status, ActionStatus::Approved);
    }

    #[test]
    fn unknown_ids_are_not_found() {
        let (store, id) = store_with_session();
        let other = SessionId::generate();
        assert!(matches!(
            store.list_actions(&other),
            Err(ActionError::SessionNotFound(_))
        ));
        assert!(matches!(
            store.add_action(&other, full_action()),
            Err(ActionError::SessionNotFound(_))
        ));
        assert!(matches!(
            store.update_action_status(&id, &ActionId::new(), Decision::Approve),
            Err(ActionError::ActionNotFound(_))
        ));
    }

    #[test]
    fn invalid_action_is_not_stored() {
        let (store, id) = store_with_session();
        let mut input = full_action();
        input.title = String::new();
        assert!(store.add_action(&id, input).is_err());
        assert!(store.list_actions(&id).unwrap().is_empty());
    }

    #[test]
    fn ended_session_is_gone() {
        let (store, id) = store_with_session();
        store.add_action(&id, full_action()).unwrap();

        store.end_session(&id).unwrap();
        assert_eq!(store.session_count().unwrap(), 0);
        assert!(matches!(
            store.list_actions(&id),
            Err(ActionError::SessionNotFound(_))
        ));
        assert!(matches!(
            store.end_session(&id),
            Err(ActionError::SessionNotFound(_))
        ));
    }

    #[test]
    fn expired_sessions_are_evicted_on_create() {
        let store = SessionStore::new();
        let stale = SessionId::parse("session-1000000000000-abcdefghi").unwrap();
        store.create_session(stale.clone(), "patient-002").unwrap();
        assert_eq!(store.session_count().unwrap(), 1);

        let fresh = SessionId::generate();
        store.create_session(fresh.clone(), "patient-001").unwrap();
        assert_eq!(store.session_count().unwrap(), 1);
        assert!(store.patient_id(&stale).is_err());
        assert_eq!(store.patient_id(&fresh).unwrap(), "patient-001");
    }

    #[test]
    fn evict_created_before_keeps_newer_sessions() {
        let store = SessionStore::with_max_age(Duration::MAX);
        let stale = SessionId::parse("session-1000000000000-abcdefghi").unwrap();
        store.create_session(stale.clone(), "patient-002").unwrap();
        let fresh = SessionId::generate();
        store.create_session(fresh.clone(), "patient-001").unwrap();

        let cutoff = DateTime::<Utc>::from_timestamp_millis(1_500_000_000_000).unwrap();
        assert_eq!(store.evict_created_before(cutoff).unwrap(), 1);
        assert!(store.patient_id(&stale).is_err());
        assert_eq!(store.patient_id(&fresh).unwrap(), "patient-001");
    }
}
