// storefront/src/storage/mod.rs

//! Durable client-side key/value storage and the cart's two persisted keys.

pub mod file;
pub mod memory;

use crate::error::{StorefrontError, StorefrontResult};
use crate::model::{CartId, CartItem, CartState};
use std::sync::Arc;
use tracing::{event, Level};

pub use file::JsonFileStore;
pub use memory::MemoryStore;

pub const CART_ID_KEY: &str = "cartId";
pub const CART_ITEMS_KEY: &str = "cartItems";

/// A process-wide string key/value store that survives restarts.
///
/// Writes are synchronous; callers must not hold other locks that an
/// implementation could need.
pub trait DurableStore: Send + Sync + 'static {
  fn get(&self, key: &str) -> StorefrontResult<Option<String>>;
  fn set(&self, key: &str, value: &str) -> StorefrontResult<()>;
  fn remove(&self, key: &str) -> StorefrontResult<()>;
}

/// What the store held for the cart at hydration time, still undecoded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoredCart {
  pub cart_id: Option<CartId>,
  pub items: Vec<CartItem>,
}

/// Typed access to the `cartId` / `cartItems` pair. Both keys are written and
/// cleared together.
#[derive(Clone)]
pub struct CartStorage {
  store: Arc<dyn DurableStore>,
}

impl CartStorage {
  pub fn new(store: Arc<dyn DurableStore>) -> Self {
    Self { store }
  }

  /// Reads both keys. A malformed value is an error so hydration can fail safe.
  pub fn load(&self) -> StorefrontResult<StoredCart> {
    let cart_id = match self.store.get(CART_ID_KEY)? {
      Some(raw) => Some(raw.trim().parse::<CartId>().map_err(|e| StorefrontError::Storage {
        key: CART_ID_KEY.to_string(),
        message: format!("not an integer cart id ({raw:?}): {e}"),
      })?),
      None => None,
    };
    let items = match self.store.get(CART_ITEMS_KEY)? {
      Some(raw) => serde_json::from_str::<Vec<CartItem>>(&raw)?,
      None => Vec::new(),
    };
    Ok(StoredCart { cart_id, items })
  }

  pub fn save(&self, state: &CartState) -> StorefrontResult<()> {
    match state.cart_id() {
      Some(id) => self.store.set(CART_ID_KEY, &id.to_string())?,
      None => self.store.remove(CART_ID_KEY)?,
    }
    let items = serde_json::to_string(state.items())?;
    self.store.set(CART_ITEMS_KEY, &items)?;
    event!(Level::TRACE, cart_id = ?state.cart_id(), lines = state.items().len(), "Cart persisted.");
    Ok(())
  }

  pub fn clear(&self) -> StorefrontResult<()> {
    self.store.remove(CART_ID_KEY)?;
    self.store.remove(CART_ITEMS_KEY)
  }
}
