//! Project data model and validation.
//!
//! A **project** is the unit the site displays and the admin API manages.
//! Records live in an ordered, file-backed collection owned by
//! [`ProjectStore`](crate::ProjectStore).
//!
//! # Operations
//!
//! All project operations are available on [`ProjectStore`](crate::ProjectStore):
//!
//! - [`list()`](crate::ProjectStore::list)
//! - [`add(draft)`](crate::ProjectStore::add)
//! - [`update(id, draft)`](crate::ProjectStore::update)
//! - [`delete(id)`](crate::ProjectStore::delete)

pub mod types;

pub use types::{ProjectCollection, ProjectDraft, ProjectId, ProjectRecord};

use crate::error::ValidationError;

/// Validates a [`ProjectDraft`] before the store stages it.
///
/// # Rules
///
/// All four fields are required and must be non-empty after trimming:
/// `title`, `description`, `image`, `github`. There is no partial-update
/// form; an update draft passes through the same check as a create draft.
pub(crate) fn validate_draft(draft: &ProjectDraft) -> Result<(), ValidationError> {
    for (field, value) in [
        ("title", &draft.title),
        ("description", &draft.description),
        ("image", &draft.image),
        ("github", &draft.github),
    ] {
        if value.trim().is_empty() {
            return Err(ValidationError::required_field(field));
        }
    }

    Ok(())
}
