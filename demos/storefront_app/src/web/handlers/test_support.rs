// demos/storefront_app/src/web/handlers/test_support.rs
//! In-memory backend for exercising the routes without the network.

use crate::config::AppConfig;
use crate::state::AppState;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use storefront::{
  CartApi, CartId, CatalogApi, LineRequest, MemoryStore, Product, ProductDetail, ProductId, ProductPage, RemoteCart,
  RemoteCartLine, StorefrontError, StorefrontResult,
};

pub fn product(id: ProductId, price: f64, stock: u32) -> Product {
  serde_json::from_value(json!({
    "id": id,
    "title": format!("Product {id}"),
    "price": price,
    "discountPercentage": 10.0,
    "stock": stock,
    "thumbnail": format!("https://cdn.test/{id}.png"),
  }))
  .unwrap()
}

pub struct StubBackend {
  products: Mutex<Vec<Product>>,
  carts: Mutex<HashMap<CartId, Vec<LineRequest>>>,
  next_cart_id: Mutex<CartId>,
  catalog_status: Mutex<Option<u16>>,
}

impl StubBackend {
  pub fn new(products: Vec<Product>) -> Self {
    Self {
      products: Mutex::new(products),
      carts: Mutex::new(HashMap::new()),
      next_cart_id: Mutex::new(50),
      catalog_status: Mutex::new(None),
    }
  }

  /// Every catalog call answers with `status` until reset with `None`.
  pub fn fail_catalog(&self, status: Option<u16>) {
    *self.catalog_status.lock() = status;
  }

  pub fn set_stock(&self, id: ProductId, stock: u32) {
    if let Some(p) = self.products.lock().iter_mut().find(|p| p.id == id) {
      p.stock = stock;
    }
  }

  pub fn remote_lines(&self, id: CartId) -> Option<Vec<LineRequest>> {
    self.carts.lock().get(&id).cloned()
  }

  fn catalog_failure(&self) -> StorefrontResult<()> {
    match *self.catalog_status.lock() {
      Some(status) => Err(StorefrontError::Http {
        status,
        status_text: "Service Unavailable".to_string(),
      }),
      None => Ok(()),
    }
  }

  fn render(&self, id: CartId, lines: &[LineRequest]) -> RemoteCart {
    let products = self.products.lock();
    RemoteCart {
      id,
      products: lines
        .iter()
        .map(|line| {
          let known = products.iter().find(|p| p.id == line.id);
          let price = known.map_or(1.0, |p| p.price);
          RemoteCartLine {
            id: line.id,
            title: known.map(|p| p.title.clone()).unwrap_or_default(),
            price,
            quantity: line.quantity,
            total: price * f64::from(line.quantity),
            discount_percentage: 0.0,
            discounted_price: price * f64::from(line.quantity),
            thumbnail: String::new(),
            stock: None,
          }
        })
        .collect(),
      total: None,
      discounted_total: None,
      total_quantity: None,
    }
  }
}

#[async_trait]
impl CatalogApi for StubBackend {
  async fn list_products(&self, limit: u64, skip: u64) -> StorefrontResult<ProductPage> {
    self.catalog_failure()?;
    let products = self.products.lock();
    Ok(ProductPage {
      products: products.iter().skip(skip as usize).take(limit as usize).cloned().collect(),
      total: products.len() as u64,
      skip,
      limit,
    })
  }

  async fn get_product(&self, id: ProductId) -> StorefrontResult<ProductDetail> {
    self.catalog_failure()?;
    let found = self.products.lock().iter().find(|p| p.id == id).cloned();
    let product = found.ok_or_else(|| StorefrontError::not_found(format!("product {id}")))?;
    Ok(ProductDetail {
      product,
      tags: vec![],
      weight: 1.0,
      dimensions: Default::default(),
      shipping_information: String::new(),
      warranty_information: String::new(),
      return_policy: String::new(),
      reviews: vec![],
    })
  }
}

#[async_trait]
impl CartApi for StubBackend {
  async fn create_cart(&self, lines: &[LineRequest]) -> StorefrontResult<RemoteCart> {
    let id = {
      let mut next = self.next_cart_id.lock();
      *next += 1;
      *next
    };
    self.carts.lock().insert(id, lines.to_vec());
    Ok(self.render(id, lines))
  }

  async fn fetch_cart(&self, id: CartId) -> StorefrontResult<RemoteCart> {
    let lines = self.carts.lock().get(&id).cloned();
    match lines {
      Some(lines) => Ok(self.render(id, &lines)),
      None => Err(StorefrontError::not_found(format!("cart {id}"))),
    }
  }

  async fn replace_cart(&self, id: CartId, lines: &[LineRequest]) -> StorefrontResult<RemoteCart> {
    self.carts.lock().insert(id, lines.to_vec());
    Ok(self.render(id, lines))
  }
}

pub fn app_state(backend: Arc<StubBackend>) -> AppState {
  let config = AppConfig {
    page_size: 2,
    recommendation_batch: 10,
    ..AppConfig::default()
  };
  AppState::new(backend, Arc::new(MemoryStore::new()), Arc::new(config))
}
