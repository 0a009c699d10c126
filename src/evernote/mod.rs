//! Evernote note service access
//!
//! Provides:
//! - Records exchanged with the service (`models`)
//! - The blocking store seam a connector implements (`store`)
//! - A bounded worker pool for store calls (`pool`)
//! - The async client facade with error translation (`client`)
//! - Appending content to existing notes (`merge`)

pub mod client;
pub mod merge;
pub mod models;
pub mod pool;
pub mod store;

pub use client::EvernoteClient;
pub use merge::NoteMerger;
pub use models::*;
pub use pool::WorkerPool;
pub use store::{FetchOptions, NoteStore, StoreConnector, UserStore};

#[cfg(test)]
pub(crate) mod mock;
