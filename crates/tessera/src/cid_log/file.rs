use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::store::{KeyLocks, LogStore, LogStoreError};

// keyed by file path, so stores opened separately on one directory
//  still serialize their writers
static FILE_LOCKS: OnceLock<KeyLocks> = OnceLock::new();

/// Log store keeping one JSON file per key inside a directory
#[derive(Debug, Clone)]
pub struct FileLogStore {
    dir: PathBuf,
}

impl FileLogStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, LogStoreError> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(LogStoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

#[async_trait]
impl LogStore for FileLogStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>, LogStoreError> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn set_item(&self, key: &str, value: String) -> Result<(), LogStoreError> {
        let path = self.path_for(key)?;
        let dir = self.dir.clone();
        let target = path.clone();
        // write aside and rename so a reader never sees a partial log
        tokio::task::spawn_blocking(move || -> Result<(), LogStoreError> {
            std::fs::create_dir_all(&dir)?;
            let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
            tmp.write_all(value.as_bytes())?;
            tmp.as_file().sync_all()?;
            tmp.persist(&target).map_err(|err| err.error)?;
            Ok(())
        })
        .await
        .map_err(anyhow::Error::from)??;
        tracing::debug!("wrote log item {} to {:?}", key, path);
        Ok(())
    }

    fn lock_for(&self, key: &str) -> Arc<Mutex<()>> {
        let id = self.dir.join(key);
        FILE_LOCKS
            .get_or_init(KeyLocks::default)
            .get(&id.to_string_lossy())
    }
}
