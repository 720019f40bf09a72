//! JSON flat-file persistence backend.
//!
//! The collection is stored as a single pretty-printed JSON document so
//! the file stays human-diffable and friendly to external inspection or
//! versioning. Writes go through a temp file in the same directory,
//! fsync, then an atomic rename; a reader (or a crash) never observes a
//! partially written file.

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use crate::error::PersistenceError;
use crate::persist::CollectionPersistence;
use crate::project::ProjectCollection;

/// Production persistence backend: one JSON file holding the envelope
/// `{ "projects": [...] }`.
#[derive(Debug)]
pub struct JsonFilePersistence {
    /// Path of the projects file.
    path: PathBuf,
}

impl JsonFilePersistence {
    /// Creates a backend for the given file path.
    ///
    /// Nothing is touched on disk until the first `persist` call; a
    /// missing file on `load` means an empty collection.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Temp-file path used for the write-then-rename sequence.
    ///
    /// Includes the pid so stale temp files from a crashed process never
    /// collide with a live writer.
    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "projects.json".to_string());
        self.path
            .with_file_name(format!("{}.tmp.{}", name, std::process::id()))
    }
}

impl CollectionPersistence for JsonFilePersistence {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn load(&self) -> Result<Option<ProjectCollection>, PersistenceError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("No projects file yet, starting empty");
                return Ok(None);
            }
            Err(err) => return Err(PersistenceError::read(&self.path, err)),
        };

        let collection: ProjectCollection =
            serde_json::from_str(&raw).map_err(|err| PersistenceError::corrupted(err.to_string()))?;

        debug!(projects = collection.len(), "Loaded projects file");
        Ok(Some(collection))
    }

    #[instrument(skip_all, fields(path = %self.path.display(), projects = collection.len()))]
    fn persist(&self, collection: &ProjectCollection) -> Result<(), PersistenceError> {
        let mut json = serde_json::to_string_pretty(collection)?;
        json.push('\n');

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|err| PersistenceError::write(&self.path, err))?;
            }
        }

        // Temp file + fsync + rename so the projects file is replaced
        // atomically and committed data survives a crash.
        let temp_path = self.temp_path();
        let write = |temp_path: &Path| -> std::io::Result<()> {
            let mut file = File::create(temp_path)?;
            file.write_all(json.as_bytes())?;
            file.sync_all()?;
            Ok(())
        };
        if let Err(err) = write(&temp_path) {
            let _ = fs::remove_file(&temp_path);
            return Err(PersistenceError::write(&self.path, err));
        }

        fs::rename(&temp_path, &self.path).map_err(|err| {
            let _ = fs::remove_file(&temp_path);
            PersistenceError::write(&self.path, err)
        })?;

        debug!("Projects file persisted");
        Ok(())
    }

    fn path(&self) -> Option<&Path> {
        Some(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::{ProjectDraft, ProjectId, ProjectRecord};
    use tempfile::tempdir;

    fn sample_collection() -> ProjectCollection {
        ProjectCollection {
            projects: vec![ProjectRecord::from_draft(
                ProjectId::from(1),
                ProjectDraft {
                    title: "Site".into(),
                    description: "The site itself".into(),
                    image: "/img/site.png".into(),
                    github: "https://github.com/folio/site".into(),
                },
            )],
        }
    }

    #[test]
    fn test_load_missing_file_is_none() {
        let dir = tempdir().unwrap();
        let persistence = JsonFilePersistence::new(dir.path().join("projects.json"));
        assert!(persistence.load().unwrap().is_none());
    }

    #[test]
    fn test_persist_then_load_roundtrip() {
        let dir = tempdir().unwrap();
        let persistence = JsonFilePersistence::new(dir.path().join("projects.json"));

        let collection = sample_collection();
        persistence.persist(&collection).unwrap();

        let reloaded = persistence.load().unwrap().expect("file must exist");
        assert_eq!(reloaded, collection);
    }

    #[test]
    fn test_persist_overwrites_whole_document() {
        let dir = tempdir().unwrap();
        let persistence = JsonFilePersistence::new(dir.path().join("projects.json"));

        persistence.persist(&sample_collection()).unwrap();
        persistence.persist(&ProjectCollection::new()).unwrap();

        let reloaded = persistence.load().unwrap().unwrap();
        assert!(reloaded.is_empty());
    }

    #[test]
    fn test_persisted_file_is_pretty_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("projects.json");
        let persistence = JsonFilePersistence::new(&path);

        persistence.persist(&sample_collection()).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        // Pretty-printed, stable field order, trailing newline.
        assert!(raw.starts_with("{\n  \"projects\": ["));
        assert!(raw.ends_with("\n"));
        let id_pos = raw.find("\"id\"").unwrap();
        let title_pos = raw.find("\"title\"").unwrap();
        assert!(id_pos < title_pos);
    }

    #[test]
    fn test_corrupted_file_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("projects.json");
        fs::write(&path, "{ not json").unwrap();

        let persistence = JsonFilePersistence::new(&path);
        let err = persistence.load().unwrap_err();
        assert!(matches!(err, PersistenceError::Corrupted(_)));
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let dir = tempdir().unwrap();
        let persistence = JsonFilePersistence::new(dir.path().join("projects.json"));
        persistence.persist(&sample_collection()).unwrap();

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name.contains(".tmp."))
            .collect();
        assert!(leftovers.is_empty(), "stale temp files: {leftovers:?}");
    }
}
