//! Durable persistence for the project collection.
//!
//! This module provides a trait-based abstraction over the collection's
//! durable mirror, allowing different backends to be used (the JSON flat
//! file in production, failure-injecting fakes in tests).
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     ProjectStore                             │
//! │                         │                                    │
//! │                         ▼                                    │
//! │            ┌─────────────────────────┐                      │
//! │            │  CollectionPersistence  │  ← Trait             │
//! │            └─────────────────────────┘                      │
//! │                    ▲           ▲                            │
//! │                    │           │                            │
//! │      ┌────────────┴──────┐  ┌─┴──────────────────┐         │
//! │      │JsonFilePersistence│  │ failing test fakes │         │
//! │      └───────────────────┘  └────────────────────┘         │
//! │             (prod)                 (test)                   │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod json_file;

pub use json_file::JsonFilePersistence;

use std::path::Path;

use crate::error::PersistenceError;
use crate::project::ProjectCollection;

/// Persistence backend for the project collection.
///
/// The collection is the sole unit of persistence: `persist` always
/// rewrites the complete document, never an incremental delta. The store
/// calls `persist` while holding its write lock, so implementations never
/// see concurrent calls.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; the store is shared across
/// request handlers behind an `Arc`.
pub trait CollectionPersistence: Send + Sync {
    /// Loads the collection from durable storage.
    ///
    /// Returns `Ok(None)` if nothing has been persisted yet (first run);
    /// the store treats that as an empty collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing file exists but cannot be read or
    /// parsed.
    fn load(&self) -> Result<Option<ProjectCollection>, PersistenceError>;

    /// Durably writes the complete collection.
    ///
    /// Must not return until the data is on disk or the write has failed;
    /// the store acknowledges a mutation only after this returns `Ok`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the file write fails. The
    /// store rolls the staged in-memory mutation back on that path.
    fn persist(&self, collection: &ProjectCollection) -> Result<(), PersistenceError>;

    /// Returns the path of the backing file, if applicable.
    ///
    /// Test fakes may not have a path.
    fn path(&self) -> Option<&Path>;
}

/// Opens the production persistence backend at the given path.
///
/// This is a convenience function that creates a [`JsonFilePersistence`].
/// The file is not created until the first persisted mutation.
pub fn open_persistence(path: impl AsRef<Path>) -> Box<dyn CollectionPersistence> {
    Box::new(JsonFilePersistence::new(path))
}
