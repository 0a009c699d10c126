//! Evernote records exchanged with the remote stores

use crate::enml::{NoteDocument, ResourceDescriptor};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A note as stored remotely. `guid` is `None` until the note is created.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Note {
    pub guid: Option<String>,
    pub title: String,
    pub notebook_guid: Option<String>,
    /// ENML body
    pub content: String,
    pub resources: Vec<ResourceDescriptor>,
}

impl From<NoteDocument> for Note {
    fn from(doc: NoteDocument) -> Self {
        Self {
            guid: None,
            title: doc.title,
            notebook_guid: doc.notebook_guid,
            content: doc.content,
            resources: doc.resources,
        }
    }
}

/// Serialized with the service's attribute names (`defaultNotebook`), which
/// are also the keys a `NotebookFilter` uses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notebook {
    pub guid: String,
    pub name: String,
    #[serde(default)]
    pub default_notebook: bool,
    #[serde(default)]
    pub stack: Option<String>,
}

/// Attribute name (camelCase) → expected value, matched against a notebook's serialized form.
pub type NotebookFilter = HashMap<String, serde_json::Value>;

impl Notebook {
    /// True when every filter entry names a field of this notebook with an equal value.
    pub fn matches(&self, filter: &NotebookFilter) -> bool {
        let record = match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(record)) => record,
            _ => return false,
        };
        filter
            .iter()
            .all(|(field, expected)| record.get(field) == Some(expected))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Accounting {
    /// Monthly upload allowance in bytes
    pub upload_limit: i64,
    /// End of the current upload period, milliseconds since the epoch
    pub upload_limit_end: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct User {
    pub id: i32,
    pub username: Option<String>,
    pub shard_id: String,
    pub accounting: Accounting,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncState {
    pub update_count: i32,
    /// Bytes uploaded in the current period
    pub uploaded: i64,
}

/// Remaining upload allowance for an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuotaInfo {
    pub remaining: i64,
    pub reset_date: DateTime<Utc>,
}

impl QuotaInfo {
    pub fn from_account(user: &User, sync_state: &SyncState) -> Option<Self> {
        let reset_date = DateTime::from_timestamp_millis(user.accounting.upload_limit_end)?;
        Some(Self {
            remaining: user.accounting.upload_limit - sync_state.uploaded,
            reset_date,
        })
    }

    /// Whether `bytes` more can be uploaded before the reset date.
    pub fn allows(&self, bytes: u64) -> bool {
        i64::try_from(bytes).map_or(false, |bytes| bytes <= self.remaining)
    }
}
