//! Project record, draft, and collection types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Project identifier.
///
/// Opaque string assigned by the store, never by the client. Ids are the
/// decimal rendering of a monotonically increasing counter, so they stay
/// unique even across delete-then-add sequences.
///
/// # Example
/// ```
/// use folio::ProjectId;
///
/// let id = ProjectId::from("1");
/// assert_eq!(id.as_str(), "1");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectId(pub String);

impl ProjectId {
    /// Returns the id as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parses the id back to its numeric counter value, if it has one.
    ///
    /// Ids written by this store are always numeric; hand-edited files
    /// may contain arbitrary strings, which simply don't contribute to
    /// counter seeding.
    #[inline]
    pub fn as_counter(&self) -> Option<u64> {
        self.0.parse().ok()
    }
}

impl From<u64> for ProjectId {
    fn from(counter: u64) -> Self {
        Self(counter.to_string())
    }
}

impl From<&str> for ProjectId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ProjectId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stored project entry.
///
/// Field order is the serialization order of the projects file, so it is
/// part of the on-disk format. All fields are required and non-empty.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRecord {
    /// Store-assigned identifier.
    pub id: ProjectId,

    /// Display title.
    pub title: String,

    /// Short description shown on the site.
    pub description: String,

    /// Image reference/URL.
    pub image: String,

    /// Repository reference/URL.
    pub github: String,
}

impl ProjectRecord {
    /// Builds a record from a validated draft and an assigned id.
    pub(crate) fn from_draft(id: ProjectId, draft: ProjectDraft) -> Self {
        Self {
            id,
            title: draft.title,
            description: draft.description,
            image: draft.image,
            github: draft.github,
        }
    }

    /// Replaces every field except the id with the draft's values.
    ///
    /// There are no partial updates; a draft always carries all four fields.
    pub(crate) fn apply_draft(&mut self, draft: ProjectDraft) {
        self.title = draft.title;
        self.description = draft.description;
        self.image = draft.image;
        self.github = draft.github;
    }
}

/// Client-supplied project fields, without an id.
///
/// Used both for create and for full update. Validated by
/// [`validate_draft`](crate::project::validate_draft) before the store
/// touches it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDraft {
    /// Display title.
    #[serde(default)]
    pub title: String,

    /// Short description shown on the site.
    #[serde(default)]
    pub description: String,

    /// Image reference/URL.
    #[serde(default)]
    pub image: String,

    /// Repository reference/URL.
    #[serde(default)]
    pub github: String,
}

/// The persisted collection envelope.
///
/// The whole file is this one document: `{ "projects": [...] }`. The
/// envelope leaves room for future sibling fields without breaking the
/// layout. Insertion order of records is preserved.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectCollection {
    /// Ordered project records.
    pub projects: Vec<ProjectRecord>,
}

impl ProjectCollection {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records in the collection.
    #[inline]
    pub fn len(&self) -> usize {
        self.projects.len()
    }

    /// Returns true if the collection holds no records.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    /// Largest numeric id present, for counter seeding.
    ///
    /// Non-numeric ids (possible in hand-edited files) are skipped.
    pub fn max_numeric_id(&self) -> u64 {
        self.projects
            .iter()
            .filter_map(|p| p.id.as_counter())
            .max()
            .unwrap_or(0)
    }

    /// Position of the record with the given id, if present.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.projects.iter().position(|p| p.id.as_str() == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u64, title: &str) -> ProjectRecord {
        ProjectRecord {
            id: ProjectId::from(id),
            title: title.to_string(),
            description: "desc".to_string(),
            image: "img.png".to_string(),
            github: "https://github.com/x/y".to_string(),
        }
    }

    #[test]
    fn test_project_id_roundtrip() {
        let id = ProjectId::from(7);
        assert_eq!(id.as_str(), "7");
        assert_eq!(id.as_counter(), Some(7));
    }

    #[test]
    fn test_project_id_non_numeric() {
        let id = ProjectId::from("legacy-slug");
        assert_eq!(id.as_counter(), None);
    }

    #[test]
    fn test_max_numeric_id_empty() {
        assert_eq!(ProjectCollection::new().max_numeric_id(), 0);
    }

    #[test]
    fn test_max_numeric_id_skips_non_numeric() {
        let mut collection = ProjectCollection::new();
        collection.projects.push(record(3, "a"));
        collection.projects.push(ProjectRecord {
            id: ProjectId::from("hand-edited"),
            ..record(0, "b")
        });
        collection.projects.push(record(9, "c"));
        assert_eq!(collection.max_numeric_id(), 9);
    }

    #[test]
    fn test_position() {
        let mut collection = ProjectCollection::new();
        collection.projects.push(record(1, "a"));
        collection.projects.push(record(2, "b"));
        assert_eq!(collection.position("2"), Some(1));
        assert_eq!(collection.position("5"), None);
    }

    #[test]
    fn test_apply_draft_keeps_id() {
        let mut rec = record(4, "old");
        rec.apply_draft(ProjectDraft {
            title: "new".into(),
            description: "d2".into(),
            image: "i2".into(),
            github: "g2".into(),
        });
        assert_eq!(rec.id.as_str(), "4");
        assert_eq!(rec.title, "new");
    }

    #[test]
    fn test_envelope_serialization_shape() {
        let mut collection = ProjectCollection::new();
        collection.projects.push(record(1, "Site"));

        let json = serde_json::to_value(&collection).unwrap();
        assert!(json.get("projects").is_some());
        assert_eq!(json["projects"][0]["id"], "1");
        assert_eq!(json["projects"][0]["title"], "Site");
    }

    #[test]
    fn test_draft_deserializes_with_missing_fields() {
        // Missing fields become empty strings and are caught by validation,
        // not by a deserialization error.
        let draft: ProjectDraft = serde_json::from_str(r#"{"title":"T"}"#).unwrap();
        assert_eq!(draft.title, "T");
        assert!(draft.description.is_empty());
    }
}
