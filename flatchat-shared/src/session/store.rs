/// Session store
///
/// `SessionStore` is the single owner of the client's identity record. It is
/// created once at startup, shared by reference (or `Arc`) with every
/// component that needs the session, and cleared on logout.
///
/// # Tiers
///
/// - **session**: the [`SessionRecord`] JSON blob under `authTokens`
/// - **durable**: `HouseholdID` / `HouseholdName` as plain strings; survives
///   `clear()` so the app can greet a returning user with their household
///
/// # Failure Semantics
///
/// No operation returns an error. Malformed stored data reads as absent. If
/// a backend fails, the tier switches to an in-memory copy seeded with the
/// last values it saw, logs one warning, and stays in memory for the rest of
/// the process.
///
/// # Example
///
/// ```
/// use flatchat_shared::models::SessionPatch;
/// use flatchat_shared::session::SessionStore;
///
/// let store = SessionStore::in_memory();
/// assert!(store.get().is_none());
///
/// store.set(SessionPatch::login("u1", "t1"));
/// store.set(SessionPatch::household("h1"));
///
/// let context = store.get().unwrap();
/// assert_eq!(context.household_id.as_deref(), Some("h1"));
/// ```

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use super::storage::{FileStorage, MemoryStorage, StorageBackend, StorageError};
use crate::models::household::{
    DurableHousehold, DURABLE_HOUSEHOLD_ID_KEY, DURABLE_HOUSEHOLD_NAME_KEY,
};
use crate::models::session::{SessionContext, SessionPatch, SessionRecord, SESSION_RECORD_KEY};

/// One storage tier with its in-memory fallback
struct Tier {
    name: &'static str,
    backend: Arc<dyn StorageBackend>,
    state: Mutex<TierState>,
}

#[derive(Default)]
struct TierState {
    degraded: bool,
    /// Last values read from or written to the backend
    mirror: HashMap<String, String>,
}

impl Tier {
    fn new(name: &'static str, backend: Arc<dyn StorageBackend>) -> Self {
        Tier {
            name,
            backend,
            state: Mutex::new(TierState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, TierState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn degrade(&self, state: &mut TierState, op: &'static str, err: &StorageError) {
        if !state.degraded {
            state.degraded = true;
            tracing::warn!(
                tier = self.name,
                backend = self.backend.name(),
                op,
                error = %err,
                "Session storage unavailable, continuing in memory"
            );
        }
    }

    fn read(&self, key: &str) -> Option<String> {
        let mut state = self.lock();
        if state.degraded {
            return state.mirror.get(key).cloned();
        }

        match self.backend.read(key) {
            Ok(Some(value)) => {
                state.mirror.insert(key.to_string(), value.clone());
                Some(value)
            }
            Ok(None) => {
                state.mirror.remove(key);
                None
            }
            Err(e) => {
                self.degrade(&mut state, "read", &e);
                state.mirror.get(key).cloned()
            }
        }
    }

    fn write(&self, key: &str, value: String) {
        let mut state = self.lock();
        if !state.degraded {
            if let Err(e) = self.backend.write(key, &value) {
                self.degrade(&mut state, "write", &e);
            }
        }
        state.mirror.insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) {
        let mut state = self.lock();
        if !state.degraded {
            if let Err(e) = self.backend.remove(key) {
                self.degrade(&mut state, "remove", &e);
            }
        }
        state.mirror.remove(key);
    }

    fn is_degraded(&self) -> bool {
        self.lock().degraded
    }
}

/// Process-wide holder of the session record and durable household record
pub struct SessionStore {
    session: Tier,
    durable: Tier,
}

impl SessionStore {
    /// Creates a store over explicit backends
    pub fn new(session: Arc<dyn StorageBackend>, durable: Arc<dyn StorageBackend>) -> Self {
        SessionStore {
            session: Tier::new("session", session),
            durable: Tier::new("durable", durable),
        }
    }

    /// Store whose tiers both live in memory
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()), Arc::new(MemoryStorage::new()))
    }

    /// Opens file-backed tiers under `state_dir`
    ///
    /// If a directory cannot be created the corresponding tier starts out in
    /// memory instead.
    pub fn open(state_dir: &Path) -> Self {
        let session = Self::file_or_memory(state_dir.join("session"));
        let durable = Self::file_or_memory(state_dir.join("durable"));
        Self::new(session, durable)
    }

    fn file_or_memory(dir: std::path::PathBuf) -> Arc<dyn StorageBackend> {
        match FileStorage::open(&dir) {
            Ok(storage) => Arc::new(storage),
            Err(e) => {
                tracing::warn!(
                    dir = %dir.display(),
                    error = %e,
                    "Cannot open session storage directory, using memory"
                );
                Arc::new(MemoryStorage::new())
            }
        }
    }

    /// Current authenticated context, if any
    ///
    /// Returns `None` when no record is stored, when the record is malformed,
    /// or when `userID` or `accessToken` is missing.
    pub fn get(&self) -> Option<SessionContext> {
        self.get_record().context()
    }

    /// Raw stored record; empty when absent or malformed
    pub fn get_record(&self) -> SessionRecord {
        let Some(raw) = self.session.read(SESSION_RECORD_KEY) else {
            return SessionRecord::default();
        };

        match serde_json::from_str::<SessionRecord>(&raw) {
            Ok(record) => record,
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring malformed session record");
                SessionRecord::default()
            }
        }
    }

    /// Merges `patch` into the stored record and writes it through
    ///
    /// Returns the merged record.
    pub fn set(&self, patch: SessionPatch) -> SessionRecord {
        let mut record = self.get_record();
        if patch.is_empty() {
            return record;
        }
        record.merge(patch);

        match serde_json::to_string(&record) {
            Ok(raw) => self.session.write(SESSION_RECORD_KEY, raw),
            Err(e) => tracing::warn!(error = %e, "Failed to serialize session record"),
        }
        record
    }

    /// Removes the session record (logout)
    pub fn clear(&self) {
        self.session.remove(SESSION_RECORD_KEY);
        tracing::debug!("Session record cleared");
    }

    /// Durable household id and name
    pub fn durable_household(&self) -> DurableHousehold {
        let non_blank = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
        DurableHousehold {
            household_id: non_blank(self.durable.read(DURABLE_HOUSEHOLD_ID_KEY)),
            household_name: non_blank(self.durable.read(DURABLE_HOUSEHOLD_NAME_KEY)),
        }
    }

    /// Records the household id in the durable tier
    pub fn remember_household_id(&self, household_id: &str) {
        self.durable
            .write(DURABLE_HOUSEHOLD_ID_KEY, household_id.to_string());
    }

    /// Records the household name in the durable tier
    pub fn remember_household_name(&self, name: &str) {
        self.durable
            .write(DURABLE_HOUSEHOLD_NAME_KEY, name.to_string());
    }

    /// Clears the durable tier
    pub fn forget_household(&self) {
        self.durable.remove(DURABLE_HOUSEHOLD_ID_KEY);
        self.durable.remove(DURABLE_HOUSEHOLD_NAME_KEY);
    }

    /// Whether either tier has fallen back to memory
    pub fn is_degraded(&self) -> bool {
        self.session.is_degraded() || self.durable.is_degraded()
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("session_backend", &self.session.backend.name())
            .field("durable_backend", &self.durable.backend.name())
            .field("degraded", &self.is_degraded())
            .finish()
    }
}
