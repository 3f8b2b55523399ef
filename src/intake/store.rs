//! Transient key-value stores backing the report inbox

use async_trait::async_trait;
use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use tokio::fs;
use tokio::sync::Mutex;

/// A small string-keyed store, in the spirit of browser local storage
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> io::Result<Option<String>>;

    async fn set(&self, key: &str, value: String) -> io::Result<()>;

    /// Read and delete in one step
    async fn take(&self, key: &str) -> io::Result<Option<String>>;

    /// Human-readable name for this store
    fn name(&self) -> &'static str;
}

/// Process-local store; contents vanish with the process
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> io::Result<()> {
        self.entries.lock().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn take(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.entries.lock().await.remove(key))
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

/// One file per key under a directory, so a report written by one process
/// can be picked up by the next
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            lock: Mutex::new(()),
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{safe}.json"))
    }

    async fn read(&self, key: &str) -> io::Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> io::Result<Option<String>> {
        let _guard = self.lock.lock().await;
        self.read(key).await
    }

    async fn set(&self, key: &str, value: String) -> io::Result<()> {
        let _guard = self.lock.lock().await;
        fs::create_dir_all(&self.dir).await?;

        // Write beside the target and rename so readers never see half a file
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).await?;
        fs::rename(&tmp, &path).await
    }

    async fn take(&self, key: &str) -> io::Result<Option<String>> {
        let _guard = self.lock.lock().await;
        let value = self.read(key).await?;
        if value.is_some() {
            fs::remove_file(self.path_for(key)).await?;
        }
        Ok(value)
    }

    fn name(&self) -> &'static str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn exercise(store: &dyn KeyValueStore) {
        assert_eq!(store.get("k").await.unwrap(), None);
        store.set("k", "v1".into()).await.unwrap();
        store.set("k", "v2".into()).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v2"));
        assert_eq!(store.take("k").await.unwrap().as_deref(), Some("v2"));
        assert_eq!(store.take("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_store() {
        exercise(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn test_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("inbox"));
        exercise(&store).await;
    }

    #[tokio::test]
    async fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        FileStore::new(dir.path())
            .set("pendingFireReports", "[]".into())
            .await
            .unwrap();

        let reopened = FileStore::new(dir.path());
        assert_eq!(
            reopened.get("pendingFireReports").await.unwrap().as_deref(),
            Some("[]")
        );
        assert!(dir.path().join("pendingFireReports.json").exists());
    }

    #[test]
    fn test_key_sanitised() {
        let store = FileStore::new("/tmp/x");
        assert_eq!(store.path_for("../etc/passwd"), PathBuf::from("/tmp/x/___etc_passwd.json"));
    }
}
