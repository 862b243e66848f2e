// storefront/src/storage/file.rs

use crate::error::{StorefrontError, StorefrontResult};
use crate::storage::DurableStore;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{event, Level};

/// A store backed by one JSON object on disk.
///
/// The whole object is rewritten (via a sibling temp file and rename) on every
/// `set`/`remove`, so the file is never observed half-written.
#[derive(Debug)]
pub struct JsonFileStore {
  path: PathBuf,
  entries: Mutex<BTreeMap<String, String>>,
}

impl JsonFileStore {
  /// Opens the store, treating a missing file as empty.
  pub fn open(path: impl Into<PathBuf>) -> StorefrontResult<Self> {
    let path = path.into();
    let entries = match fs::read_to_string(&path) {
      Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
      Ok(raw) => serde_json::from_str(&raw).map_err(|e| storage_error(&path, format!("unreadable store file: {e}")))?,
      Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
      Err(e) => return Err(storage_error(&path, e.to_string())),
    };
    event!(Level::DEBUG, path = %path.display(), keys = entries.len(), "Durable store opened.");
    Ok(Self {
      path,
      entries: Mutex::new(entries),
    })
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  fn flush(&self, entries: &BTreeMap<String, String>) -> StorefrontResult<()> {
    let raw = serde_json::to_string_pretty(entries)?;
    let tmp = self.path.with_extension("tmp");
    fs::write(&tmp, raw).map_err(|e| storage_error(&self.path, e.to_string()))?;
    fs::rename(&tmp, &self.path).map_err(|e| storage_error(&self.path, e.to_string()))
  }
}

fn storage_error(path: &Path, message: String) -> StorefrontError {
  StorefrontError::Storage {
    key: path.display().to_string(),
    message,
  }
}

impl DurableStore for JsonFileStore {
  fn get(&self, key: &str) -> StorefrontResult<Option<String>> {
    Ok(self.entries.lock().get(key).cloned())
  }

  fn set(&self, key: &str, value: &str) -> StorefrontResult<()> {
    let mut entries = self.entries.lock();
    entries.insert(key.to_string(), value.to_string());
    self.flush(&entries)
  }

  fn remove(&self, key: &str) -> StorefrontResult<()> {
    let mut entries = self.entries.lock();
    if entries.remove(key).is_some() {
      self.flush(&entries)?;
    }
    Ok(())
  }
}
