// tests/common/mod.rs
#![allow(dead_code)] // Allow unused code in this common test module

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use storefront::{
  CartApi, CartId, CartSynchronizer, CatalogApi, LineRequest, MemoryStore, Product, ProductDetail, ProductId,
  ProductPage, RemoteCart, RemoteCartLine, StorefrontError, StorefrontResult,
};
use tokio::sync::Notify;
use tracing::Level;

// --- Catalog fixtures ---

pub fn product(id: ProductId, price: f64, stock: u32) -> Product {
  Product {
    id,
    title: format!("Product {id}"),
    description: format!("Description of product {id}"),
    price,
    discount_percentage: 10.0,
    rating: 4.5,
    stock,
    brand: Some("Acme".to_string()),
    category: "misc".to_string(),
    thumbnail: format!("https://cdn.test/{id}/thumb.png"),
    images: vec![format!("https://cdn.test/{id}/1.png")],
  }
}

pub fn detail(product: Product) -> ProductDetail {
  ProductDetail {
    product,
    tags: vec!["misc".to_string()],
    weight: 1.0,
    dimensions: Default::default(),
    shipping_information: "Ships in 1 week".to_string(),
    warranty_information: "No warranty".to_string(),
    return_policy: "30 days return policy".to_string(),
    reviews: vec![],
  }
}

pub fn products(ids: std::ops::RangeInclusive<ProductId>) -> Vec<Product> {
  ids.map(|id| product(id, 10.0, 5)).collect()
}

// --- Failure injection ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
  NotFound,
  Status(u16),
  Malformed,
}

impl Failure {
  pub fn into_error(self, resource: &str) -> StorefrontError {
    match self {
      Failure::NotFound => StorefrontError::not_found(resource),
      Failure::Status(status) => StorefrontError::Http {
        status,
        status_text: match status {
          500 => "Internal Server Error".to_string(),
          503 => "Service Unavailable".to_string(),
          _ => String::new(),
        },
      },
      Failure::Malformed => StorefrontError::MalformedResponse {
        context: resource.to_string(),
        source: serde_json::from_str::<RemoteCart>("{}").unwrap_err(),
      },
    }
  }
}

// --- Fake remote cart service ---

#[derive(Debug, Clone, PartialEq)]
pub enum CartCall {
  Create(Vec<LineRequest>),
  Fetch(CartId),
  Replace(CartId, Vec<LineRequest>),
}

/// An in-memory stand-in for the remote cart API. Echoes requested lines back
/// with prices from its price list (default 100.0, 10% discount).
pub struct FakeCartApi {
  next_id: Mutex<CartId>,
  carts: Mutex<HashMap<CartId, Vec<LineRequest>>>,
  prices: Mutex<HashMap<ProductId, f64>>,
  calls: Mutex<Vec<CartCall>>,
  failures: Mutex<VecDeque<Failure>>,
  hold: Mutex<Option<(Arc<Notify>, Arc<Notify>)>>,
}

impl FakeCartApi {
  pub fn new(first_id: CartId) -> Self {
    Self {
      next_id: Mutex::new(first_id),
      carts: Mutex::new(HashMap::new()),
      prices: Mutex::new(HashMap::new()),
      calls: Mutex::new(Vec::new()),
      failures: Mutex::new(VecDeque::new()),
      hold: Mutex::new(None),
    }
  }

  pub fn with_cart(self, id: CartId, lines: Vec<LineRequest>) -> Self {
    self.carts.lock().insert(id, lines);
    self
  }

  pub fn set_price(&self, id: ProductId, price: f64) {
    self.prices.lock().insert(id, price);
  }

  /// The next call fails with `failure`; queued failures apply in order.
  pub fn fail_next(&self, failure: Failure) {
    self.failures.lock().push_back(failure);
  }

  /// Makes the next replace call wait: `entered` is notified when it starts,
  /// and it completes after `release` is notified.
  pub fn hold_next_replace(&self) -> (Arc<Notify>, Arc<Notify>) {
    let entered = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    *self.hold.lock() = Some((entered.clone(), release.clone()));
    (entered, release)
  }

  pub fn calls(&self) -> Vec<CartCall> {
    self.calls.lock().clone()
  }

  pub fn remote_lines(&self, id: CartId) -> Option<Vec<LineRequest>> {
    self.carts.lock().get(&id).cloned()
  }

  fn take_failure(&self) -> Option<Failure> {
    self.failures.lock().pop_front()
  }

  fn render(&self, id: CartId, lines: &[LineRequest]) -> RemoteCart {
    let prices = self.prices.lock();
    let products: Vec<RemoteCartLine> = lines
      .iter()
      .map(|line| {
        let price = prices.get(&line.id).copied().unwrap_or(100.0);
        let total = price * f64::from(line.quantity);
        RemoteCartLine {
          id: line.id,
          title: format!("Product {}", line.id),
          price,
          quantity: line.quantity,
          total,
          discount_percentage: 10.0,
          discounted_price: total * 0.9,
          thumbnail: String::new(),
          stock: None,
        }
      })
      .collect();
    RemoteCart {
      id,
      total: Some(products.iter().map(|p| p.total).sum()),
      discounted_total: Some(products.iter().map(|p| p.discounted_price).sum()),
      total_quantity: Some(products.iter().map(|p| p.quantity).sum()),
      products,
    }
  }
}

#[async_trait]
impl CartApi for FakeCartApi {
  async fn create_cart(&self, lines: &[LineRequest]) -> StorefrontResult<RemoteCart> {
    self.calls.lock().push(CartCall::Create(lines.to_vec()));
    if let Some(failure) = self.take_failure() {
      return Err(failure.into_error("new cart"));
    }
    let id = {
      let mut next = self.next_id.lock();
      let id = *next;
      *next += 1;
      id
    };
    self.carts.lock().insert(id, lines.to_vec());
    Ok(self.render(id, lines))
  }

  async fn fetch_cart(&self, id: CartId) -> StorefrontResult<RemoteCart> {
    self.calls.lock().push(CartCall::Fetch(id));
    if let Some(failure) = self.take_failure() {
      return Err(failure.into_error("cart"));
    }
    let lines = self.carts.lock().get(&id).cloned();
    match lines {
      Some(lines) => Ok(self.render(id, &lines)),
      None => Err(StorefrontError::not_found(format!("cart {id}"))),
    }
  }

  async fn replace_cart(&self, id: CartId, lines: &[LineRequest]) -> StorefrontResult<RemoteCart> {
    self.calls.lock().push(CartCall::Replace(id, lines.to_vec()));
    let hold = self.hold.lock().take();
    if let Some((entered, release)) = hold {
      entered.notify_one();
      release.notified().await;
    }
    if let Some(failure) = self.take_failure() {
      return Err(failure.into_error("cart"));
    }
    if !self.carts.lock().contains_key(&id) {
      return Err(StorefrontError::not_found(format!("cart {id}")));
    }
    self.carts.lock().insert(id, lines.to_vec());
    Ok(self.render(id, lines))
  }
}

// --- Fake catalog ---

/// Serves pages out of `products`, unless scripted pages are queued, which
/// are returned verbatim first.
pub struct FakeCatalogApi {
  products: Mutex<Vec<Product>>,
  scripted_pages: Mutex<VecDeque<ProductPage>>,
  failures: Mutex<VecDeque<Failure>>,
  list_calls: Mutex<Vec<(u64, u64)>>,
  get_calls: Mutex<Vec<ProductId>>,
}

impl FakeCatalogApi {
  pub fn new(products: Vec<Product>) -> Self {
    Self {
      products: Mutex::new(products),
      scripted_pages: Mutex::new(VecDeque::new()),
      failures: Mutex::new(VecDeque::new()),
      list_calls: Mutex::new(Vec::new()),
      get_calls: Mutex::new(Vec::new()),
    }
  }

  pub fn script_page(&self, page: ProductPage) {
    self.scripted_pages.lock().push_back(page);
  }

  pub fn fail_next(&self, failure: Failure) {
    self.failures.lock().push_back(failure);
  }

  pub fn set_stock(&self, id: ProductId, stock: u32) {
    if let Some(p) = self.products.lock().iter_mut().find(|p| p.id == id) {
      p.stock = stock;
    }
  }

  pub fn list_calls(&self) -> Vec<(u64, u64)> {
    self.list_calls.lock().clone()
  }

  pub fn get_calls(&self) -> Vec<ProductId> {
    self.get_calls.lock().clone()
  }
}

#[async_trait]
impl CatalogApi for FakeCatalogApi {
  async fn list_products(&self, limit: u64, skip: u64) -> StorefrontResult<ProductPage> {
    self.list_calls.lock().push((limit, skip));
    if let Some(failure) = self.failures.lock().pop_front() {
      return Err(failure.into_error("product list"));
    }
    if let Some(page) = self.scripted_pages.lock().pop_front() {
      return Ok(page);
    }
    let products = self.products.lock();
    let page: Vec<Product> = products.iter().skip(skip as usize).take(limit as usize).cloned().collect();
    Ok(ProductPage {
      products: page,
      total: products.len() as u64,
      skip,
      limit,
    })
  }

  async fn get_product(&self, id: ProductId) -> StorefrontResult<ProductDetail> {
    self.get_calls.lock().push(id);
    if let Some(failure) = self.failures.lock().pop_front() {
      return Err(failure.into_error(&format!("product {id}")));
    }
    let found = self.products.lock().iter().find(|p| p.id == id).cloned();
    found
      .map(detail)
      .ok_or_else(|| StorefrontError::not_found(format!("product {id}")))
  }
}

// --- Synchronizer wiring ---

pub struct Harness {
  pub api: Arc<FakeCartApi>,
  pub store: Arc<MemoryStore>,
  pub sync: CartSynchronizer,
}

pub fn harness_with(api: FakeCartApi, store: Arc<MemoryStore>) -> Harness {
  let api = Arc::new(api);
  let sync = CartSynchronizer::new(api.clone(), store.clone());
  Harness { api, store, sync }
}

pub fn harness() -> Harness {
  harness_with(FakeCartApi::new(777), Arc::new(MemoryStore::new()))
}

/// A synchronizer that already owns remote cart 777 holding `lines`
/// (product, quantity), with the given stock ceilings recorded locally.
pub async fn harness_with_lines(lines: &[(Product, u32)]) -> Harness {
  let h = harness();
  let (first, first_qty) = &lines[0];
  h.sync.add(first, *first_qty).await;
  for (p, qty) in &lines[1..] {
    h.sync.add(p, *qty).await;
  }
  h
}

pub fn assert_cart_invariants(sync: &CartSynchronizer) {
  let state = sync.snapshot();
  let sum: u32 = state.items().iter().map(|item| item.quantity).sum();
  assert_eq!(state.total_quantity(), sum, "total quantity must equal the line sum");
  for item in state.items() {
    assert!(item.quantity >= 1, "line {} has zero quantity", item.id);
    assert!(
      item.quantity <= item.stock,
      "line {} quantity {} exceeds stock {}",
      item.id,
      item.quantity,
      item.stock
    );
  }
}

// --- Helper for Tracing Setup (call once per test run if needed) ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer() // Important for tests to capture output
    .try_init()
    .ok(); // Allow multiple initializations in tests (ok if fails)
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
