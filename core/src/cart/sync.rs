// storefront/src/cart/sync.rs

//! The cart synchronizer: single source of truth for the shopping cart.
//!
//! Local edits are applied optimistically, persisted to the durable store, then
//! pushed to the remote cart as a full replace. The server's response becomes the
//! new state, except for stock ceilings which only the client knows.
//!
//! Operations (hydration included) are single-flight: each waits its turn on an
//! async gate, so overlapping callers are applied in arrival order instead of
//! interleaving their optimistic updates. Failures never escape this type; they
//! are logged and reflected in [`SyncStatus`].

use crate::api::{CartApi, CatalogApi};
use crate::cart::reconcile;
use crate::error::{StorefrontError, StorefrontResult};
use crate::model::{CartId, CartItem, CartState, LineRequest, Product, ProductId};
use crate::storage::{CartStorage, DurableStore};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{event, instrument, Level};

/// Whether local state is known to match the remote cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SyncStatus {
  /// The last remote round trip succeeded (or there is nothing to sync).
  Synced,
  /// Lines exist locally but no remote cart has been confirmed yet.
  LocalOnly,
  /// The last remote call failed; the optimistic local state was kept.
  Unsynced { reason: String },
}

fn status_after(adoption: &reconcile::Adoption) -> SyncStatus {
  if adoption.clamped {
    SyncStatus::Unsynced {
      reason: "remote quantity exceeds the stock ceiling".to_string(),
    }
  } else {
    SyncStatus::Synced
  }
}

/// Marks the synchronizer busy for as long as it lives.
struct LoadingGuard<'a>(&'a AtomicUsize);

impl<'a> LoadingGuard<'a> {
  fn enter(counter: &'a AtomicUsize) -> Self {
    counter.fetch_add(1, Ordering::SeqCst);
    LoadingGuard(counter)
  }
}

impl Drop for LoadingGuard<'_> {
  fn drop(&mut self) {
    self.0.fetch_sub(1, Ordering::SeqCst);
  }
}

pub struct CartSynchronizer {
  api: Arc<dyn CartApi>,
  storage: CartStorage,
  state: RwLock<CartState>,
  status: RwLock<SyncStatus>,
  gate: AsyncMutex<()>,
  in_flight: AtomicUsize,
  hydrated: AtomicBool,
  disposed: AtomicBool,
}

impl CartSynchronizer {
  /// Creates an empty, unhydrated synchronizer. Call [`hydrate`](Self::hydrate)
  /// once at startup.
  pub fn new(api: Arc<dyn CartApi>, store: Arc<dyn DurableStore>) -> Self {
    Self {
      api,
      storage: CartStorage::new(store),
      state: RwLock::new(CartState::empty()),
      status: RwLock::new(SyncStatus::Synced),
      gate: AsyncMutex::new(()),
      in_flight: AtomicUsize::new(0),
      hydrated: AtomicBool::new(false),
      disposed: AtomicBool::new(false),
    }
  }

  pub fn snapshot(&self) -> CartState {
    self.state.read().clone()
  }

  pub fn quantity_of(&self, product_id: ProductId) -> u32 {
    self.state.read().quantity_of(product_id)
  }

  /// True while any operation is queued or in flight. Views disable cart
  /// controls while this is set.
  pub fn is_loading(&self) -> bool {
    self.in_flight.load(Ordering::SeqCst) > 0
  }

  pub fn sync_status(&self) -> SyncStatus {
    self.status.read().clone()
  }

  /// Stops applying remote results. Responses that resolve afterwards are
  /// dropped and nothing more is persisted.
  pub fn dispose(&self) {
    self.disposed.store(true, Ordering::SeqCst);
  }

  pub fn is_disposed(&self) -> bool {
    self.disposed.load(Ordering::SeqCst)
  }

  fn discarded(&self, operation: &str) -> bool {
    let disposed = self.is_disposed();
    if disposed {
      event!(Level::DEBUG, operation, "Synchronizer disposed; discarding result.");
    }
    disposed
  }

  fn set_status(&self, status: SyncStatus) {
    *self.status.write() = status;
  }

  fn commit(&self, next: CartState) -> CartState {
    *self.state.write() = next.clone();
    self.persist(&next);
    next
  }

  fn persist(&self, state: &CartState) {
    if let Err(e) = self.storage.save(state) {
      event!(Level::ERROR, error = %e, "Failed to persist cart to the durable store.");
    }
  }

  /// Restores the cart from the durable store and the remote API. Runs once;
  /// later calls return the current state. Never fails: any unexpected error
  /// clears the store and leaves an empty cart.
  #[instrument(name = "CartSynchronizer::hydrate", skip(self))]
  pub async fn hydrate(&self) -> CartState {
    if self.hydrated.swap(true, Ordering::SeqCst) {
      return self.snapshot();
    }
    let _loading = LoadingGuard::enter(&self.in_flight);
    let _turn = self.gate.lock().await;

    match self.restore().await {
      Ok(Some((state, status))) => {
        self.set_status(status);
        *self.state.write() = state.clone();
        state
      }
      Ok(None) => self.snapshot(),
      Err(e) => {
        event!(Level::ERROR, error = %e, "Cart hydration failed; clearing durable store.");
        if let Err(clear_err) = self.storage.clear() {
          event!(Level::ERROR, error = %clear_err, "Failed to clear durable store.");
        }
        self.set_status(SyncStatus::Synced);
        let empty = CartState::empty();
        *self.state.write() = empty.clone();
        empty
      }
    }
  }

  async fn restore(&self) -> StorefrontResult<Option<(CartState, SyncStatus)>> {
    let stored = self.storage.load()?;

    let Some(cart_id) = stored.cart_id else {
      if stored.items.is_empty() {
        event!(Level::DEBUG, "No stored cart; starting empty.");
        return Ok(Some((CartState::empty(), SyncStatus::Synced)));
      }
      event!(Level::INFO, lines = stored.items.len(), "Adopting local-only cart.");
      let state = CartState::from_items(stored.items, None);
      return Ok(Some((state, SyncStatus::LocalOnly)));
    };

    match self.api.fetch_cart(cart_id).await {
      Ok(remote) => {
        if self.discarded("hydrate") {
          return Ok(None);
        }
        let adoption = reconcile::adopt_remote(&remote, &stored.items);
        if !adoption.clamped {
          self.storage.save(&adoption.state)?;
          event!(Level::INFO, cart_id, lines = adoption.state.items().len(), "Cart hydrated from remote.");
          return Ok(Some((adoption.state, SyncStatus::Synced)));
        }

        // The remote cart holds more than the recorded ceilings allow.
        event!(Level::WARN, cart_id, "Remote cart exceeds stock ceilings; pushing corrected lines.");
        let lines = adoption.state.line_requests();
        let known = adoption.state.items().to_vec();
        let state = match self.push(cart_id, lines, known).await {
          Ok(state) => state,
          Err(e) => {
            event!(Level::WARN, cart_id, error = %e, "Corrected cart could not be synced; keeping clamped lines.");
            self.storage.save(&adoption.state)?;
            adoption.state
          }
        };
        Ok(Some((state, self.sync_status())))
      }
      Err(e) if e.is_not_found() => {
        event!(Level::WARN, cart_id, "Stored cart no longer exists remotely; resetting.");
        self.storage.clear()?;
        Ok(Some((CartState::empty(), SyncStatus::Synced)))
      }
      Err(e) => {
        event!(Level::WARN, cart_id, error = %e, "Remote cart fetch failed; using stored lines.");
        let state = CartState::from_items(stored.items, Some(cart_id));
        Ok(Some((state, SyncStatus::Unsynced { reason: e.to_string() })))
      }
    }
  }

  /// Full-replace push of `lines` to the remote cart, adopting the response.
  /// `known` supplies the stock ceilings to carry over. On failure the
  /// optimistic state stays in place and the error is returned for logging.
  async fn push(&self, cart_id: CartId, lines: Vec<LineRequest>, known: Vec<CartItem>) -> StorefrontResult<CartState> {
    let _loading = LoadingGuard::enter(&self.in_flight);
    match self.api.replace_cart(cart_id, &lines).await {
      Ok(remote) => {
        if self.discarded("replace_cart") {
          return Ok(self.snapshot());
        }
        let adoption = reconcile::adopt_remote(&remote, &known);
        self.set_status(status_after(&adoption));
        Ok(self.commit(adoption.state))
      }
      Err(e) => {
        self.set_status(SyncStatus::Unsynced { reason: e.to_string() });
        Err(e)
      }
    }
  }

  /// Adds `quantity` units of `product`, creating the remote cart first if none
  /// exists yet.
  #[instrument(name = "CartSynchronizer::add", skip(self, product), fields(product_id = product.id))]
  pub async fn add(&self, product: &Product, quantity: u32) -> CartState {
    let _loading = LoadingGuard::enter(&self.in_flight);
    let _turn = self.gate.lock().await;
    if self.discarded("add") {
      return self.snapshot();
    }
    if quantity == 0 {
      event!(Level::WARN, "Add to cart requires a positive quantity; ignoring.");
      return self.snapshot();
    }

    let cart_id = self.state.read().cart_id();
    let Some(cart_id) = cart_id else {
      return self.create_with(product, quantity).await;
    };

    let prepared = {
      let mut state = self.state.write();
      let existed = state.line(product.id).is_some();
      let resulting = reconcile::apply_add(&mut state, product, quantity);
      event!(Level::DEBUG, resulting, "Applied optimistic add.");
      (existed || resulting > 0).then(|| (state.line_requests(), state.items().to_vec()))
    };
    let Some((lines, known)) = prepared else {
      event!(Level::WARN, stock = product.stock, "Product is out of stock; nothing added.");
      return self.snapshot();
    };
    self.persist(&self.snapshot());

    match self.push(cart_id, lines, known).await {
      Ok(state) => state,
      Err(e) => {
        event!(Level::WARN, error = %e, "Add to cart could not be synced; keeping local state.");
        self.snapshot()
      }
    }
  }

  /// Creates the remote cart seeded with every local line plus the new one.
  async fn create_with(&self, product: &Product, quantity: u32) -> CartState {
    let mut seeded = self.snapshot();
    if reconcile::apply_add(&mut seeded, product, quantity) == 0 {
      event!(Level::WARN, stock = product.stock, "Product is out of stock; nothing added.");
      return self.snapshot();
    }
    let lines = seeded.line_requests();
    let known = seeded.items().to_vec();

    match self.api.create_cart(&lines).await {
      Ok(remote) => {
        if self.discarded("create_cart") {
          return self.snapshot();
        }
        let adoption = reconcile::adopt_remote(&remote, &known);
        event!(Level::INFO, cart_id = remote.id, "Remote cart created.");
        self.set_status(status_after(&adoption));
        self.commit(adoption.state)
      }
      Err(e) => {
        event!(Level::WARN, error = %e, "Remote cart creation failed; keeping line locally.");
        if self.discarded("create_cart") {
          return self.snapshot();
        }
        self.set_status(SyncStatus::Unsynced { reason: e.to_string() });
        self.commit(seeded)
      }
    }
  }

  /// Sets a line's quantity: `<= 0` removes it, otherwise clamped to
  /// `[1, stock]`. Requires an existing remote cart and line.
  #[instrument(name = "CartSynchronizer::update_quantity", skip(self))]
  pub async fn update_quantity(&self, product_id: ProductId, quantity: i64) -> CartState {
    let _loading = LoadingGuard::enter(&self.in_flight);
    let _turn = self.gate.lock().await;
    if self.discarded("update_quantity") {
      return self.snapshot();
    }

    let prepared = self.prepare_set_quantity(product_id, |_| quantity);
    self.sync_prepared("update_quantity", prepared).await
  }

  /// Moves a line's quantity by `delta`. The current quantity is read when
  /// this operation's turn comes, so queued adjustments all take effect.
  /// Landing at or below 0 removes the line.
  #[instrument(name = "CartSynchronizer::adjust_quantity", skip(self))]
  pub async fn adjust_quantity(&self, product_id: ProductId, delta: i64) -> CartState {
    let _loading = LoadingGuard::enter(&self.in_flight);
    let _turn = self.gate.lock().await;
    if self.discarded("adjust_quantity") {
      return self.snapshot();
    }

    let prepared = self.prepare_set_quantity(product_id, |current| i64::from(current).saturating_add(delta));
    self.sync_prepared("adjust_quantity", prepared).await
  }

  /// Applies `target(current)` as the new quantity of an existing line. Caller
  /// holds the gate.
  fn prepare_set_quantity(
    &self,
    product_id: ProductId,
    target: impl FnOnce(u32) -> i64,
  ) -> StorefrontResult<(CartId, Vec<LineRequest>, Vec<CartItem>)> {
    let mut state = self.state.write();
    let cart_id = state
      .cart_id()
      .ok_or_else(|| StorefrontError::Misuse("no remote cart exists".into()))?;
    let current = state
      .line(product_id)
      .map(|line| line.quantity)
      .ok_or_else(|| StorefrontError::Misuse(format!("product {product_id} is not in the cart")))?;
    reconcile::apply_set_quantity(&mut state, product_id, target(current));
    Ok((cart_id, state.line_requests(), state.items().to_vec()))
  }

  /// Removes a line. Requires an existing remote cart and line.
  #[instrument(name = "CartSynchronizer::remove_from_cart", skip(self))]
  pub async fn remove_from_cart(&self, product_id: ProductId) -> CartState {
    let _loading = LoadingGuard::enter(&self.in_flight);
    let _turn = self.gate.lock().await;
    if self.discarded("remove_from_cart") {
      return self.snapshot();
    }

    let prepared = {
      let mut state = self.state.write();
      match state.cart_id() {
        None => Err(StorefrontError::Misuse("no remote cart exists".into())),
        Some(cart_id) => {
          if reconcile::apply_remove(&mut state, product_id) {
            Ok((cart_id, state.line_requests(), state.items().to_vec()))
          } else {
            Err(StorefrontError::Misuse(format!("product {product_id} is not in the cart")))
          }
        }
      }
    };
    self.sync_prepared("remove_from_cart", prepared).await
  }

  /// Empties the cart. With a remote cart, pushes an empty line list and keeps
  /// the cart id so the next add reuses it.
  #[instrument(name = "CartSynchronizer::clear_cart", skip(self))]
  pub async fn clear_cart(&self) -> CartState {
    let _loading = LoadingGuard::enter(&self.in_flight);
    let _turn = self.gate.lock().await;
    if self.discarded("clear_cart") {
      return self.snapshot();
    }

    let cart_id = self.state.read().cart_id();
    let Some(cart_id) = cart_id else {
      self.set_status(SyncStatus::Synced);
      return self.commit(CartState::empty());
    };

    {
      let mut state = self.state.write();
      state.items_mut().clear();
      state.normalize();
    }
    self.sync_prepared("clear_cart", Ok((cart_id, Vec::new(), Vec::new()))).await
  }

  /// Refreshes a line's stock ceiling from the catalog, trimming its quantity
  /// (or removing it) when stock dropped, and syncing if anything changed.
  #[instrument(name = "CartSynchronizer::revalidate_stock", skip(self, catalog))]
  pub async fn revalidate_stock(&self, catalog: &dyn CatalogApi, product_id: ProductId) -> CartState {
    let _loading = LoadingGuard::enter(&self.in_flight);
    let _turn = self.gate.lock().await;
    if self.discarded("revalidate_stock") {
      return self.snapshot();
    }
    if self.state.read().line(product_id).is_none() {
      event!(Level::WARN, "Cannot revalidate stock for a product that is not in the cart.");
      return self.snapshot();
    }

    let fresh = match catalog.get_product(product_id).await {
      Ok(detail) => detail.product,
      Err(e) => {
        event!(Level::WARN, error = %e, "Stock revalidation fetch failed; keeping recorded ceiling.");
        return self.snapshot();
      }
    };
    if self.discarded("revalidate_stock") {
      return self.snapshot();
    }

    let (changed, cart_id, lines, known) = {
      let mut state = self.state.write();
      let changed = reconcile::apply_stock(&mut state, product_id, fresh.stock).unwrap_or(false);
      (changed, state.cart_id(), state.line_requests(), state.items().to_vec())
    };
    event!(Level::DEBUG, stock = fresh.stock, changed, "Stock ceiling refreshed.");

    match cart_id {
      Some(cart_id) if changed => self.sync_prepared("revalidate_stock", Ok((cart_id, lines, known))).await,
      _ => {
        let state = self.snapshot();
        self.persist(&state);
        state
      }
    }
  }

  async fn sync_prepared(
    &self,
    operation: &str,
    prepared: StorefrontResult<(CartId, Vec<LineRequest>, Vec<CartItem>)>,
  ) -> CartState {
    let (cart_id, lines, known) = match prepared {
      Ok(prepared) => prepared,
      Err(e) => {
        event!(Level::WARN, operation, error = %e, "Ignoring cart operation.");
        return self.snapshot();
      }
    };
    self.persist(&self.snapshot());
    match self.push(cart_id, lines, known).await {
      Ok(state) => state,
      Err(e) => {
        event!(Level::WARN, operation, error = %e, "Cart change could not be synced; keeping local state.");
        self.snapshot()
      }
    }
  }
}

impl std::fmt::Debug for CartSynchronizer {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("CartSynchronizer")
      .field("state", &*self.state.read())
      .field("status", &*self.status.read())
      .field("loading", &self.is_loading())
      .field("disposed", &self.is_disposed())
      .finish()
  }
}
