//! File-backed key-value store.
//!
//! Each key is one file (`<dir>/<key>.json`). Writes go to a sibling temp
//! file that is renamed over the target, so a crash mid-write leaves the
//! previous value intact.

use medbot_application::{KeyValueStore, StorageError};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

const EXTENSION: &str = "json";

/// [`KeyValueStore`] persisting each key in its own file.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    dir: PathBuf,
}

impl FileKeyValueStore {
    /// Use `dir` for storage. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.{EXTENSION}")))
    }
}

/// Keys become file names: ASCII letters, digits, `-` and `_` only.
fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;

        let tmp = self.dir.join(format!(".{key}.{EXTENSION}.tmp"));
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(value.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &path)?;

        debug!(key, bytes = value.len(), path = %path.display(), "Stored value");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medbot_application::{ConversationStore, HISTORY_KEY};
    use medbot_domain::ChatMessage;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn missing_key_is_none() {
        let dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(dir.path());
        assert_eq!(store.get("theme").unwrap(), None);
    }

    #[test]
    fn set_get_remove() {
        let dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(dir.path().join("nested"));

        store.set("theme", "\"light\"").unwrap();
        assert_eq!(store.get("theme").unwrap().as_deref(), Some("\"light\""));
        assert!(dir.path().join("nested/theme.json").exists());

        store.set("theme", "\"dark\"").unwrap();
        assert_eq!(store.get("theme").unwrap().as_deref(), Some("\"dark\""));

        store.remove("theme").unwrap();
        assert_eq!(store.get("theme").unwrap(), None);
        // Removing again is fine
        store.remove("theme").unwrap();
    }

    #[test]
    fn no_temp_file_left_behind() {
        let dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(dir.path());
        store.set("chatHistory", "[]").unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["chatHistory.json".to_string()]);
    }

    #[test]
    fn rejects_path_like_keys() {
        let dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(dir.path());
        for key in ["", "../escape", "a/b", "with space"] {
            assert!(matches!(
                store.set(key, "x"),
                Err(StorageError::InvalidKey(_))
            ));
        }
    }

    #[test]
    fn history_survives_a_new_store() {
        let dir = TempDir::new().unwrap();

        {
            let mut conversations =
                ConversationStore::load(Arc::new(FileKeyValueStore::new(dir.path()))).unwrap();
            conversations.current_mut().record_exchange(
                ChatMessage::user("What is the Krebs cycle?"),
                ChatMessage::assistant("A series of reactions..."),
            );
            conversations.save_current().unwrap();
        }

        let store = FileKeyValueStore::new(dir.path());
        assert!(store.get(HISTORY_KEY).unwrap().is_some());

        let conversations = ConversationStore::load(Arc::new(store)).unwrap();
        assert_eq!(conversations.history().len(), 1);
        assert_eq!(
            conversations.history().iter().next().unwrap().title(),
            "What is the Krebs cycle?"
        );
    }
}
