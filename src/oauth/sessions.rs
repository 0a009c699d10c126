//! Authorizations waiting for their OAuth callback.
//!
//! An entry is inserted when the user is sent to the authorize URL and is
//! removed by the first callback carrying its key.

use super::RequestToken;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAuthorization {
    pub callback_key: String,
    pub session_key: String,
    pub user_id: i64,
    pub access_type: String,
    pub request_token: RequestToken,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct PendingAuthorizations {
    pending: DashMap<String, PendingAuthorization>,
}

impl PendingAuthorizations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an authorization; returns the one it replaced for the same key.
    pub fn insert(&self, authorization: PendingAuthorization) -> Option<PendingAuthorization> {
        self.pending
            .insert(authorization.callback_key.clone(), authorization)
    }

    /// Remove and return the authorization for `callback_key`.
    pub fn take(&self, callback_key: &str) -> Option<PendingAuthorization> {
        self.pending.remove(callback_key).map(|(_, auth)| auth)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drop authorizations older than `max_age`; returns how many were dropped.
    ///
    /// `start_authorization` runs this on every new authorization.
    pub fn purge_older_than(&self, max_age: Duration) -> usize {
        let cutoff = Utc::now() - max_age;
        let before = self.pending.len();
        self.pending.retain(|_, auth| auth.created_at >= cutoff);
        let purged = before.saturating_sub(self.pending.len());
        if purged > 0 {
            tracing::debug!(purged, "Purged expired OAuth authorizations");
        }
        purged
    }
}
