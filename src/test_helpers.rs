//! Test helper factories
//!
//! Convenience functions for creating Evernote records with sensible defaults.
#![allow(dead_code)]

use crate::evernote::models::*;
use crate::{AccessCredentials, Config};
use std::collections::HashMap;

// ============================================================================
// Evernote records
// ============================================================================

/// Create a stored note with a guid and no resources
pub fn test_note(guid: &str, title: &str, content: &str) -> Note {
    Note {
        guid: Some(guid.to_string()),
        title: title.to_string(),
        notebook_guid: None,
        content: content.to_string(),
        resources: Vec::new(),
    }
}

pub fn test_notebook(guid: &str, name: &str, default_notebook: bool) -> Notebook {
    Notebook {
        guid: guid.to_string(),
        name: name.to_string(),
        default_notebook,
        stack: None,
    }
}

pub fn test_user(id: i32, shard_id: &str) -> User {
    User {
        id,
        username: Some(format!("user{id}")),
        shard_id: shard_id.to_string(),
        accounting: Accounting::default(),
    }
}

// ============================================================================
// Config
// ============================================================================

/// Config with a single `basic` access type using key "key" / secret "secret"
pub fn test_config() -> Config {
    Config {
        host: "callback.url".to_string(),
        webhook_url: "https://callback.url/telegram/webhook".to_string(),
        telegram_token: "bot-token".to_string(),
        sandbox: false,
        max_workers: 10,
        access: HashMap::from([(
            "basic".to_string(),
            AccessCredentials {
                key: "key".to_string(),
                secret: "secret".to_string(),
            },
        )]),
    }
}
