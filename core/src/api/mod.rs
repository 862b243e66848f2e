// storefront/src/api/mod.rs

//! The seam between the storefront and the remote product/cart REST service.
//!
//! Views and the cart synchronizer depend on these traits only, so tests (and
//! alternative backends) can substitute their own implementations.

pub mod http;

use crate::error::StorefrontResult;
use crate::model::{CartId, LineRequest, ProductDetail, ProductId, ProductPage, RemoteCart};
use async_trait::async_trait;

pub use http::{ApiConfig, HttpStorefrontApi};

/// Read access to the product catalog.
#[async_trait]
pub trait CatalogApi: Send + Sync + 'static {
  /// `GET /products?limit=N&skip=M`.
  async fn list_products(&self, limit: u64, skip: u64) -> StorefrontResult<ProductPage>;

  /// `GET /products/:id`. A missing product is `StorefrontError::NotFound`.
  async fn get_product(&self, id: ProductId) -> StorefrontResult<ProductDetail>;
}

/// The remote cart document API. Every write is a full replace of the line list.
#[async_trait]
pub trait CartApi: Send + Sync + 'static {
  /// `POST /carts/add`, seeding the new cart with `lines`.
  async fn create_cart(&self, lines: &[LineRequest]) -> StorefrontResult<RemoteCart>;

  /// `GET /carts/:id`. A missing cart is `StorefrontError::NotFound`.
  async fn fetch_cart(&self, id: CartId) -> StorefrontResult<RemoteCart>;

  /// `PUT /carts/:id` with `merge: false`.
  async fn replace_cart(&self, id: CartId, lines: &[LineRequest]) -> StorefrontResult<RemoteCart>;
}
