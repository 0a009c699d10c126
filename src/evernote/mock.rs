//! In-memory mock implementation of the store seam for testing without a real Evernote account.

use super::models::*;
use super::store::{FetchOptions, NoteStore, StoreConnector, UserStore};
use crate::error::StoreError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Shared state behind every store handed out by a `MockStoreConnector`.
#[derive(Debug, Default)]
pub struct MockState {
    pub notes: HashMap<String, Note>,
    pub notebooks: Vec<Notebook>,
    pub user: User,
    pub sync_state: SyncState,
    /// Method names in call order
    pub calls: Vec<&'static str>,
    /// Auth tokens stores were opened with
    pub tokens: Vec<String>,
    pub created: Vec<Note>,
    pub updated: Vec<Note>,
    /// Returned (once) by the next store call
    pub fail_next: Option<StoreError>,
    next_guid: usize,
}

/// Connector handing out note/user stores over one shared `MockState`.
///
/// Tracks how many store calls run at once so pool bounds can be asserted.
#[derive(Clone)]
pub struct MockStoreConnector {
    state: Arc<Mutex<MockState>>,
    host: String,
    delay: Option<Duration>,
    active: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

impl MockStoreConnector {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState::default())),
            host: "www.evernote.com".to_string(),
            delay: None,
            active: Arc::new(AtomicUsize::new(0)),
            peak: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Make every store call sleep for `delay`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_host(mut self, host: &str) -> Self {
        self.host = host.to_string();
        self
    }

    pub fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().expect("mock state poisoned")
    }

    /// Highest number of store calls observed running at the same time.
    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn insert_note(&self, note: Note) {
        let guid = note.guid.clone().expect("seeded note needs a guid");
        self.state().notes.insert(guid, note);
    }

    pub fn fail_next(&self, error: StoreError) {
        self.state().fail_next = Some(error);
    }

    fn store(&self) -> MockStore {
        MockStore {
            connector: self.clone(),
        }
    }
}

impl Default for MockStoreConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreConnector for MockStoreConnector {
    fn note_store(&self, auth_token: &str) -> Result<Box<dyn NoteStore>, StoreError> {
        self.state().tokens.push(auth_token.to_string());
        Ok(Box::new(self.store()))
    }

    fn user_store(&self, auth_token: &str) -> Result<Box<dyn UserStore>, StoreError> {
        self.state().tokens.push(auth_token.to_string());
        Ok(Box::new(self.store()))
    }

    fn service_host(&self) -> String {
        self.host.clone()
    }
}

struct MockStore {
    connector: MockStoreConnector,
}

impl MockStore {
    /// Record the call, apply the configured delay and any injected failure.
    fn enter(&self, method: &'static str) -> Result<(), StoreError> {
        let c = &self.connector;
        let now = c.active.fetch_add(1, Ordering::SeqCst) + 1;
        c.peak.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = c.delay {
            std::thread::sleep(delay);
        }
        c.active.fetch_sub(1, Ordering::SeqCst);

        let mut state = c.state();
        state.calls.push(method);
        match state.fail_next.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl NoteStore for MockStore {
    fn create_note(&self, note: &Note) -> Result<Note, StoreError> {
        self.enter("createNote")?;
        let mut state = self.connector.state();
        state.next_guid += 1;
        let mut created = note.clone();
        created.guid = Some(format!("note-{}", state.next_guid));
        state.created.push(created.clone());
        state
            .notes
            .insert(created.guid.clone().unwrap_or_default(), created.clone());
        Ok(created)
    }

    fn update_note(&self, note: &Note) -> Result<Note, StoreError> {
        self.enter("updateNote")?;
        let mut state = self.connector.state();
        let guid = note.guid.clone().ok_or(StoreError::User {
            code: 2,
            parameter: Some("Note.guid".to_string()),
        })?;
        if !state.notes.contains_key(&guid) {
            return Err(StoreError::NotFound {
                identifier: Some("Note.guid".to_string()),
                key: Some(guid),
            });
        }
        state.notes.insert(guid, note.clone());
        state.updated.push(note.clone());
        Ok(note.clone())
    }

    fn get_note(&self, guid: &str, _options: FetchOptions) -> Result<Note, StoreError> {
        self.enter("getNote")?;
        self.connector
            .state()
            .notes
            .get(guid)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                identifier: Some("Note.guid".to_string()),
                key: Some(guid.to_string()),
            })
    }

    fn get_default_notebook(&self) -> Result<Notebook, StoreError> {
        self.enter("getDefaultNotebook")?;
        self.connector
            .state()
            .notebooks
            .iter()
            .find(|nb| nb.default_notebook)
            .cloned()
            .ok_or(StoreError::NotFound {
                identifier: Some("Notebook.default".to_string()),
                key: None,
            })
    }

    fn list_notebooks(&self) -> Result<Vec<Notebook>, StoreError> {
        self.enter("listNotebooks")?;
        Ok(self.connector.state().notebooks.clone())
    }

    fn get_sync_state(&self) -> Result<SyncState, StoreError> {
        self.enter("getSyncState")?;
        Ok(self.connector.state().sync_state.clone())
    }
}

impl UserStore for MockStore {
    fn get_user(&self) -> Result<User, StoreError> {
        self.enter("getUser")?;
        Ok(self.connector.state().user.clone())
    }
}
