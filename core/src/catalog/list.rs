// storefront/src/catalog/list.rs

//! Incrementally growing product grid backed by `limit`/`skip` pagination.

use crate::api::CatalogApi;
use crate::error::StorefrontResult;
use crate::model::Product;
use serde::Serialize;
use std::sync::Arc;
use tracing::{event, instrument, Level};

pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// Render model of the list at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListView {
  pub products: Vec<Product>,
  pub total: u64,
  pub has_more: bool,
  pub end_of_results: bool,
  pub error: Option<String>,
}

pub struct ProductListLoader {
  api: Arc<dyn CatalogApi>,
  page_size: u64,
  products: Vec<Product>,
  total: u64,
  exhausted: bool,
  error: Option<String>,
}

impl ProductListLoader {
  pub fn new(api: Arc<dyn CatalogApi>, page_size: u64) -> Self {
    Self {
      api,
      page_size: page_size.max(1),
      products: Vec::new(),
      total: 0,
      exhausted: false,
      error: None,
    }
  }

  /// Discards everything loaded so far and fetches the first page.
  #[instrument(name = "ProductListLoader::load_initial", skip(self), fields(page_size = self.page_size))]
  pub async fn load_initial(&mut self) -> StorefrontResult<()> {
    self.products.clear();
    self.total = 0;
    self.exhausted = false;
    self.error = None;
    self.fetch_page().await
  }

  /// Called when the sentinel below the grid scrolls into view. Fetches the
  /// next page unless the list is exhausted or in the error state. Returns
  /// whether a fetch was issued.
  #[instrument(name = "ProductListLoader::on_sentinel_visible", skip(self), fields(loaded = self.products.len()))]
  pub async fn on_sentinel_visible(&mut self) -> bool {
    if !self.has_more() || self.error.is_some() {
      return false;
    }
    // Failures are recorded in `self.error` for the view.
    let _ = self.fetch_page().await;
    true
  }

  async fn fetch_page(&mut self) -> StorefrontResult<()> {
    let skip = self.products.len() as u64;
    match self.api.list_products(self.page_size, skip).await {
      Ok(page) => {
        let received = page.products.len();
        self.total = page.total;
        self.products.extend(page.products);
        if received == 0 || self.products.len() as u64 >= self.total {
          self.exhausted = true;
        }
        event!(Level::DEBUG, received, loaded = self.products.len(), total = self.total, "Product page appended.");
        Ok(())
      }
      Err(e) => {
        event!(Level::ERROR, error = %e, skip, "Failed to fetch product page.");
        self.error = Some(format!("Failed to fetch products: {}", e.status_text()));
        Err(e)
      }
    }
  }

  pub fn products(&self) -> &[Product] {
    &self.products
  }

  pub fn total(&self) -> u64 {
    self.total
  }

  pub fn has_more(&self) -> bool {
    !self.exhausted
  }

  pub fn error(&self) -> Option<&str> {
    self.error.as_deref()
  }

  /// The "end of results" marker shows only once something was ever loaded.
  pub fn show_end_of_results(&self) -> bool {
    self.exhausted && !self.products.is_empty()
  }

  pub fn view(&self) -> ProductListView {
    ProductListView {
      products: self.products.clone(),
      total: self.total,
      has_more: self.has_more(),
      end_of_results: self.show_end_of_results(),
      error: self.error.clone(),
    }
  }
}
