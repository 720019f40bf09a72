//! The project store — owner of the collection and its durable mirror.
//!
//! [`ProjectStore`] is the single owner of the in-memory project
//! collection. Every read and write of the collection and the backing
//! file goes through it:
//!
//! - Mutations (`add`, `update`, `delete`) run under the write lock, so
//!   the read-modify-persist sequence of one mutation never interleaves
//!   with another. Lost updates and id collisions are impossible.
//! - `list` takes the read lock and returns a snapshot of the latest
//!   committed state; it never observes a half-applied mutation.
//! - Each mutation stages its change, persists the full collection, and
//!   commits on success or rolls back on failure before returning. The
//!   caller never sees in-memory state that disk does not reflect.
//!
//! # Identifier assignment
//!
//! Ids come from a monotonically increasing counter seeded at load time
//! from the largest numeric id on disk. The counter only advances on a
//! successfully persisted add, and never goes backwards on delete, so an
//! add → delete → add sequence yields a fresh id rather than reusing the
//! freed one.
//!
//! # Thread Safety
//!
//! `ProjectStore` is `Send + Sync` and is shared across request handlers
//! behind an `Arc`.

use std::path::Path;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{info, instrument};

use crate::error::{NotFoundError, Result};
use crate::persist::{open_persistence, CollectionPersistence};
use crate::project::{validate_draft, ProjectCollection, ProjectDraft, ProjectId, ProjectRecord};

/// Collection state guarded by the store's lock.
struct StoreState {
    /// The authoritative in-memory collection.
    collection: ProjectCollection,

    /// Next id to issue. Monotonic; advances only on a persisted add.
    next_id: u64,
}

/// The authoritative, file-backed project store.
///
/// Create one with [`ProjectStore::open()`] (production JSON file) or
/// [`ProjectStore::with_persistence()`] (any backend, used by tests).
pub struct ProjectStore {
    /// Durable mirror of the collection.
    persistence: Box<dyn CollectionPersistence>,

    /// Collection plus id counter, guarded for the concurrency contract.
    state: RwLock<StoreState>,
}

impl std::fmt::Debug for ProjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectStore")
            .field("projects", &self.len())
            .field("path", &self.persistence.path())
            .finish_non_exhaustive()
    }
}

impl ProjectStore {
    /// Opens the store over the JSON projects file at `path`.
    ///
    /// The collection is loaded once here; a missing file means an empty
    /// collection and the file appears on the first persisted mutation.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::with_persistence(open_persistence(path))
    }

    /// Opens the store over an arbitrary persistence backend.
    #[instrument(skip(persistence), fields(path = ?persistence.path()))]
    pub fn with_persistence(persistence: Box<dyn CollectionPersistence>) -> Result<Self> {
        let collection = persistence.load()?.unwrap_or_default();
        let next_id = collection.max_numeric_id() + 1;

        info!(
            projects = collection.len(),
            next_id, "Project store loaded"
        );

        Ok(Self {
            persistence,
            state: RwLock::new(StoreState {
                collection,
                next_id,
            }),
        })
    }

    /// Returns a snapshot of the full collection.
    ///
    /// Runs under the read lock: concurrent lists proceed together, and a
    /// list concurrent with a mutation sees either its pre- or post-state.
    pub fn list(&self) -> ProjectCollection {
        self.read_state().collection.clone()
    }

    /// Returns the record with the given id, if present.
    pub fn get(&self, id: &str) -> Option<ProjectRecord> {
        let state = self.read_state();
        state
            .collection
            .position(id)
            .map(|index| state.collection.projects[index].clone())
    }

    /// Number of records currently in the collection.
    pub fn len(&self) -> usize {
        self.read_state().collection.len()
    }

    /// Returns true if the collection holds no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Validates the draft, assigns a fresh id, appends the record, and
    /// persists the collection.
    ///
    /// Returns the new record once it is durable.
    ///
    /// # Errors
    ///
    /// - [`ValidationError`](crate::ValidationError) if any field is
    ///   missing or empty; the collection is untouched.
    /// - [`PersistenceError`](crate::PersistenceError) if the durable
    ///   write fails; the appended record is removed again and the id
    ///   counter does not advance.
    #[instrument(skip(self, draft))]
    pub fn add(&self, draft: ProjectDraft) -> Result<ProjectRecord> {
        validate_draft(&draft)?;

        let mut state = self.write_state();
        let record = ProjectRecord::from_draft(ProjectId::from(state.next_id), draft);

        state.collection.projects.push(record.clone());
        if let Err(err) = self.persistence.persist(&state.collection) {
            state.collection.projects.pop();
            return Err(err.into());
        }
        state.next_id += 1;

        info!(id = %record.id, "Project added");
        Ok(record)
    }

    /// Replaces every field of the record with the draft's values (the id
    /// is unchanged) and persists the collection.
    ///
    /// # Errors
    ///
    /// - [`ValidationError`](crate::ValidationError) if any field is
    ///   missing or empty.
    /// - [`NotFoundError`](crate::NotFoundError) if no record has the id.
    /// - [`PersistenceError`](crate::PersistenceError) if the durable
    ///   write fails; the previous record is restored.
    #[instrument(skip(self, draft))]
    pub fn update(&self, id: &str, draft: ProjectDraft) -> Result<ProjectRecord> {
        validate_draft(&draft)?;

        let mut state = self.write_state();
        let index = state
            .collection
            .position(id)
            .ok_or_else(|| NotFoundError::project(id))?;

        let previous = state.collection.projects[index].clone();
        state.collection.projects[index].apply_draft(draft);

        if let Err(err) = self.persistence.persist(&state.collection) {
            state.collection.projects[index] = previous;
            return Err(err.into());
        }

        let record = state.collection.projects[index].clone();
        info!(id = %record.id, "Project updated");
        Ok(record)
    }

    /// Removes the record with the given id and persists the collection.
    ///
    /// # Errors
    ///
    /// - [`NotFoundError`](crate::NotFoundError) if no record has the id.
    /// - [`PersistenceError`](crate::PersistenceError) if the durable
    ///   write fails; the record is re-inserted at its original position.
    #[instrument(skip(self))]
    pub fn delete(&self, id: &str) -> Result<()> {
        let mut state = self.write_state();
        let index = state
            .collection
            .position(id)
            .ok_or_else(|| NotFoundError::project(id))?;

        let removed = state.collection.projects.remove(index);
        if let Err(err) = self.persistence.persist(&state.collection) {
            state.collection.projects.insert(index, removed);
            return Err(err.into());
        }

        info!(id, "Project deleted");
        Ok(())
    }

    // =========================================================================
    // Lock helpers
    // =========================================================================

    fn read_state(&self) -> RwLockReadGuard<'_, StoreState> {
        // A poisoned guard still holds a committed snapshot: every
        // mutation commits or rolls back before it can unwind.
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}
