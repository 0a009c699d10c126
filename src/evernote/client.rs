//! Async Evernote client
//!
//! Every remote call is a closure over an account-scoped store, dispatched on
//! the client's `WorkerPool`. Store failures come back as `EvernoteError`s
//! with the original failure chained as the source.

use super::models::*;
use super::pool::WorkerPool;
use super::store::{FetchOptions, NoteStore, StoreConnector, UserStore};
use crate::enml::{ContentBuilder, NoteInput};
use crate::error::{EvernoteError, Result, StoreError};
use crate::Config;
use std::sync::Arc;

#[derive(Clone)]
pub struct EvernoteClient {
    connector: Arc<dyn StoreConnector>,
    pool: WorkerPool,
}

impl EvernoteClient {
    /// Create a client with a default-sized worker pool.
    pub fn new(connector: Arc<dyn StoreConnector>) -> Self {
        Self::with_pool(connector, WorkerPool::default())
    }

    /// Create a client whose pool is sized by `config.max_workers`.
    pub fn from_config(connector: Arc<dyn StoreConnector>, config: &Config) -> Self {
        tracing::debug!(max_workers = config.max_workers, "Creating Evernote client");
        Self::with_pool(connector, WorkerPool::new(config.max_workers))
    }

    pub fn with_pool(connector: Arc<dyn StoreConnector>, pool: WorkerPool) -> Self {
        Self { connector, pool }
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    /// Stop dispatching remote calls. In-flight calls run to completion.
    pub fn shutdown(&self) {
        self.pool.shutdown();
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    async fn dispatch<T, F>(&self, method: &'static str, job: F) -> Result<T>
    where
        F: FnOnce() -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        tracing::debug!(method, "Start call");
        let result = self.pool.run(job).await.map_err(|e| EvernoteError::Api {
            message: format!("{method} was not executed: {e}"),
            source: Some(Box::new(e)),
        })?;

        match &result {
            Ok(_) => tracing::debug!(method, "Finish call"),
            Err(EvernoteError::RateLimit { retry_after, .. }) => tracing::error!(
                method,
                rate_limit_duration = retry_after.as_secs(),
                "Evernote rate limit reached"
            ),
            Err(e) => tracing::warn!(method, error = %e, "Evernote call failed"),
        }
        result
    }

    async fn with_note_store<T, F>(&self, method: &'static str, auth_token: &str, call: F) -> Result<T>
    where
        F: FnOnce(&dyn NoteStore) -> std::result::Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let connector = Arc::clone(&self.connector);
        let token = auth_token.to_string();
        self.dispatch(method, move || {
            let store = connector.note_store(&token)?;
            Ok(call(store.as_ref())?)
        })
        .await
    }

    async fn with_user_store<T, F>(&self, method: &'static str, auth_token: &str, call: F) -> Result<T>
    where
        F: FnOnce(&dyn UserStore) -> std::result::Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let connector = Arc::clone(&self.connector);
        let token = auth_token.to_string();
        self.dispatch(method, move || {
            let store = connector.user_store(&token)?;
            Ok(call(store.as_ref())?)
        })
        .await
    }

    // ========================================================================
    // Notes
    // ========================================================================

    pub async fn create_note(&self, auth_token: &str, note: Note) -> Result<Note> {
        self.with_note_store("createNote", auth_token, move |store| {
            store.create_note(&note)
        })
        .await
    }

    /// Build a note from message content and create it.
    ///
    /// Attachments are read on the worker pool together with the remote call.
    pub async fn new_note(
        &self,
        auth_token: &str,
        notebook_guid: Option<String>,
        input: NoteInput,
    ) -> Result<Note> {
        let connector = Arc::clone(&self.connector);
        let token = auth_token.to_string();
        self.dispatch("createNote", move || {
            let builder = match notebook_guid {
                Some(guid) => ContentBuilder::in_notebook(guid),
                None => ContentBuilder::new(),
            };
            let note = Note::from(builder.build(&input)?);
            let store = connector.note_store(&token)?;
            Ok(store.create_note(&note)?)
        })
        .await
    }

    pub async fn update_note(&self, auth_token: &str, note: Note) -> Result<Note> {
        self.with_note_store("updateNote", auth_token, move |store| {
            store.update_note(&note)
        })
        .await
    }

    /// Fetch a note with its body and resource data.
    pub async fn get_note(&self, auth_token: &str, note_guid: &str) -> Result<Note> {
        let guid = note_guid.to_string();
        self.with_note_store("getNote", auth_token, move |store| {
            store.get_note(&guid, FetchOptions::FULL)
        })
        .await
    }

    // ========================================================================
    // Notebooks and account
    // ========================================================================

    pub async fn get_default_notebook(&self, auth_token: &str) -> Result<Notebook> {
        self.with_note_store("getDefaultNotebook", auth_token, |store| {
            store.get_default_notebook()
        })
        .await
    }

    /// All notebooks, or only those matching every entry of `filter`.
    pub async fn list_notebooks(
        &self,
        auth_token: &str,
        filter: Option<&NotebookFilter>,
    ) -> Result<Vec<Notebook>> {
        let notebooks = self
            .with_note_store("listNotebooks", auth_token, |store| store.list_notebooks())
            .await?;
        Ok(match filter {
            Some(filter) => notebooks.into_iter().filter(|nb| nb.matches(filter)).collect(),
            None => notebooks,
        })
    }

    /// Permalink to a note, either as a web URL or as an `evernote:` app link.
    pub async fn get_note_link(
        &self,
        auth_token: &str,
        note_guid: &str,
        app_link: bool,
    ) -> Result<String> {
        let user = self
            .with_user_store("getUser", auth_token, |store| store.get_user())
            .await?;
        let host = self.connector.service_host();
        Ok(note_link(&host, &user, note_guid, app_link))
    }

    pub async fn get_quota_info(&self, auth_token: &str) -> Result<QuotaInfo> {
        let connector = Arc::clone(&self.connector);
        let token = auth_token.to_string();
        let (user, sync_state) = self
            .dispatch("getQuotaInfo", move || {
                let user = connector.user_store(&token)?.get_user()?;
                let sync_state = connector.note_store(&token)?.get_sync_state()?;
                Ok((user, sync_state))
            })
            .await?;

        QuotaInfo::from_account(&user, &sync_state).ok_or_else(|| {
            EvernoteError::api(format!(
                "invalid upload limit end: {}",
                user.accounting.upload_limit_end
            ))
        })
    }
}

pub fn note_link(host: &str, user: &User, note_guid: &str, app_link: bool) -> String {
    if app_link {
        format!(
            "evernote:///view/{}/{}/{}/{}/",
            user.id, user.shard_id, note_guid, note_guid
        )
    } else {
        format!(
            "https://{}/shard/{}/nl/{}/{}/",
            host, user.shard_id, user.id, note_guid
        )
    }
}
