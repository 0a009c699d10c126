//! Remote store seam
//!
//! One method per remote call. Implementations perform blocking I/O; the
//! client only ever calls them from worker-pool threads.

use super::models::*;
use crate::error::StoreError;

/// What to include when fetching a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    pub with_content: bool,
    pub with_resources_data: bool,
}

impl FetchOptions {
    /// Body plus resource bytes, as needed to rewrite a note.
    pub const FULL: Self = Self {
        with_content: true,
        with_resources_data: true,
    };
}

/// Note store operations for a single authenticated account.
pub trait NoteStore: Send {
    fn create_note(&self, note: &Note) -> Result<Note, StoreError>;

    fn update_note(&self, note: &Note) -> Result<Note, StoreError>;

    fn get_note(&self, guid: &str, options: FetchOptions) -> Result<Note, StoreError>;

    fn get_default_notebook(&self) -> Result<Notebook, StoreError>;

    fn list_notebooks(&self) -> Result<Vec<Notebook>, StoreError>;

    fn get_sync_state(&self) -> Result<SyncState, StoreError>;
}

/// User store operations for a single authenticated account.
pub trait UserStore: Send {
    fn get_user(&self) -> Result<User, StoreError>;
}

/// Opens account-scoped stores from an auth token.
pub trait StoreConnector: Send + Sync {
    fn note_store(&self, auth_token: &str) -> Result<Box<dyn NoteStore>, StoreError>;

    fn user_store(&self, auth_token: &str) -> Result<Box<dyn UserStore>, StoreError>;

    /// Host serving note permalinks, e.g. `www.evernote.com`
    fn service_host(&self) -> String;
}
