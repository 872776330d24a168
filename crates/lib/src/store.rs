use std::{
    collections::BTreeMap,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};

use log::{debug, trace};
use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::Mutex;

use crate::StoreError;

const VALUE_EXTENSION: &str = "json";
const TEMP_EXTENSION: &str = "json.tmp";

/// Asynchronous string key-value storage backing every persisted record.
///
/// Keys may contain `/` to group related entries; [`KeyValueStore::keys_with_prefix`]
/// is the only way to enumerate them.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, StoreError>> + Send;

    fn set(&self, key: &str, value: &str) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Removing an absent key is not an error.
    fn remove(&self, key: &str) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// All keys starting with `prefix`, sorted.
    fn keys_with_prefix(
        &self,
        prefix: &str,
    ) -> impl Future<Output = Result<Vec<String>, StoreError>> + Send;

    fn multi_remove(&self, keys: &[&str]) -> impl Future<Output = Result<(), StoreError>> + Send {
        async move {
            for key in keys {
                self.remove(key).await?;
            }
            Ok(())
        }
    }

    fn get_json<T: DeserializeOwned + Send>(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<T>, StoreError>> + Send {
        async move {
            let Some(raw) = self.get(key).await? else {
                return Ok(None);
            };
            serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| StoreError::malformed(key, e))
        }
    }

    fn set_json<T: Serialize + Sync + ?Sized>(
        &self,
        key: &str,
        value: &T,
    ) -> impl Future<Output = Result<(), StoreError>> + Send {
        async move {
            let raw = serde_json::to_string(value)
                .map_err(|e| StoreError::write(key, std::io::Error::other(e)))?;
            self.set(key, &raw).await
        }
    }
}

/// Volatile store, shared between clones.
#[derive(Clone, Default, Debug)]
pub struct MemoryStore {
    entries: Arc<Mutex<BTreeMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.lock().await.remove(key);
        Ok(())
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .entries
            .lock()
            .await
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect())
    }
}

/// Durable store keeping one JSON file per key below a root directory.
///
/// `collections/abc` is stored at `<root>/collections/abc.json`. Writes go
/// through a temporary file and a rename.
#[derive(Clone, Debug)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|e| StoreError::write(&root.to_string_lossy(), e))?;
        debug!("Opened file store at {}", root.display());
        Ok(FileStore { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> std::io::Result<PathBuf> {
        let segments: Vec<&str> = key.split('/').collect();
        let valid = segments.iter().all(|segment| {
            !segment.is_empty()
                && *segment != "."
                && *segment != ".."
                && !segment.contains('\\')
                && !segment.ends_with(".tmp")
        });
        if !valid {
            return Err(std::io::Error::new(
                ErrorKind::InvalidInput,
                format!("Invalid store key {:?}", key),
            ));
        }

        let Some((last, dirs)) = segments.split_last() else {
            return Err(std::io::Error::new(ErrorKind::InvalidInput, "Empty store key"));
        };
        let mut path = self.root.clone();
        for dir in dirs {
            path.push(dir);
        }
        path.push(format!("{}.{}", last, VALUE_EXTENSION));
        Ok(path)
    }

    /// Deepest directory that can hold every key starting with `prefix`.
    ///
    /// `None` when the prefix names a directory no valid key can live in.
    fn listing_root(&self, prefix: &str) -> Option<PathBuf> {
        let Some((dirs, _)) = prefix.rsplit_once('/') else {
            return Some(self.root.clone());
        };
        let mut path = self.root.clone();
        for dir in dirs.split('/') {
            if dir.is_empty() || dir == "." || dir == ".." || dir.contains('\\') {
                return None;
            }
            path.push(dir);
        }
        Some(path)
    }

    fn key_for(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let name = relative.to_str()?.strip_suffix(&format!(".{}", VALUE_EXTENSION))?;
        Some(name.replace(std::path::MAIN_SEPARATOR, "/"))
    }
}

impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key).map_err(|e| StoreError::read(key, e))?;
        trace!("Reading {}", path.display());
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::read(key, e)),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key).map_err(|e| StoreError::write(key, e))?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::write(key, e))?;
        }

        let temp = path.with_extension(TEMP_EXTENSION);
        trace!("Writing {}", path.display());
        tokio::fs::write(&temp, value)
            .await
            .map_err(|e| StoreError::write(key, e))?;
        tokio::fs::rename(&temp, &path)
            .await
            .map_err(|e| StoreError::write(key, e))?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key).map_err(|e| StoreError::write(key, e))?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::write(key, e)),
        }
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let mut keys = Vec::new();
        let Some(start) = self.listing_root(prefix) else {
            return Ok(keys);
        };
        let mut pending = vec![start];

        while let Some(dir) = pending.pop() {
            let mut entries = match tokio::fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(StoreError::read(prefix, e)),
            };
            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| StoreError::read(prefix, e))?
            {
                let path = entry.path();
                let file_type = entry
                    .file_type()
                    .await
                    .map_err(|e| StoreError::read(prefix, e))?;
                if file_type.is_dir() {
                    pending.push(path);
                } else if let Some(key) = self.key_for(&path) {
                    if key.starts_with(prefix) {
                        keys.push(key);
                    }
                }
            }
        }

        keys.sort();
        Ok(keys)
    }
}
