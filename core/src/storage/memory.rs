// storefront/src/storage/memory.rs

use crate::error::StorefrontResult;
use crate::storage::DurableStore;
use parking_lot::Mutex;
use std::collections::HashMap;

/// In-process store. Used by tests and when no store path is configured.
#[derive(Debug, Default)]
pub struct MemoryStore {
  entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn len(&self) -> usize {
    self.entries.lock().len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.lock().is_empty()
  }
}

impl DurableStore for MemoryStore {
  fn get(&self, key: &str) -> StorefrontResult<Option<String>> {
    Ok(self.entries.lock().get(key).cloned())
  }

  fn set(&self, key: &str, value: &str) -> StorefrontResult<()> {
    self.entries.lock().insert(key.to_string(), value.to_string());
    Ok(())
  }

  fn remove(&self, key: &str) -> StorefrontResult<()> {
    self.entries.lock().remove(key);
    Ok(())
  }
}
