// storefront/src/catalog/detail.rs

//! Single-product page. Quantity controls delegate to the cart synchronizer.

use crate::api::CatalogApi;
use crate::cart::CartSynchronizer;
use crate::model::{CartState, Product, ProductDetail, ProductId};
use serde::Serialize;
use tracing::{event, instrument, Level};

pub const PRODUCT_NOT_FOUND: &str = "Product Not Found";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DetailState {
  Found { product: Box<ProductDetail> },
  NotFound { message: String },
  Failed { message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetailPage {
  pub product_id: ProductId,
  #[serde(flatten)]
  pub state: DetailState,
  /// Quantity of this product already in the cart when the page was loaded.
  pub cart_quantity: u32,
}

impl ProductDetailPage {
  #[instrument(name = "ProductDetailPage::load", skip(catalog, cart))]
  pub async fn load(catalog: &dyn CatalogApi, cart: &CartSynchronizer, product_id: ProductId) -> Self {
    let state = match catalog.get_product(product_id).await {
      Ok(detail) => DetailState::Found {
        product: Box::new(detail),
      },
      Err(e) if e.is_not_found() => {
        event!(Level::INFO, "Product does not exist.");
        DetailState::NotFound {
          message: PRODUCT_NOT_FOUND.to_string(),
        }
      }
      Err(e) => {
        event!(Level::ERROR, error = %e, "Failed to fetch product.");
        DetailState::Failed {
          message: format!("Failed to fetch product: {}", e.status_text()),
        }
      }
    };
    Self {
      product_id,
      state,
      cart_quantity: cart.quantity_of(product_id),
    }
  }

  pub fn product(&self) -> Option<&ProductDetail> {
    match &self.state {
      DetailState::Found { product } => Some(product.as_ref()),
      _ => None,
    }
  }

  /// Cart controls exist only for a product that was found.
  pub fn controls(&self) -> Option<QuantityControls<'_>> {
    self.product().map(|detail| QuantityControls {
      product: &detail.product,
    })
  }
}

/// Add/increment/decrement/remove buttons for one product. Increment and
/// decrement are deltas applied in the synchronizer's queue order.
#[derive(Debug, Clone, Copy)]
pub struct QuantityControls<'a> {
  product: &'a Product,
}

impl<'a> QuantityControls<'a> {
  pub fn new(product: &'a Product) -> Self {
    Self { product }
  }

  pub fn product(&self) -> &Product {
    self.product
  }

  /// Disabled while the synchronizer is busy or the line is at its ceiling.
  pub fn can_increment(&self, cart: &CartSynchronizer) -> bool {
    !cart.is_loading() && self.product.stock > 0 && cart.quantity_of(self.product.id) < self.ceiling(cart)
  }

  fn ceiling(&self, cart: &CartSynchronizer) -> u32 {
    cart
      .snapshot()
      .line(self.product.id)
      .map_or(self.product.stock, |line| line.stock)
  }

  pub async fn add(&self, cart: &CartSynchronizer, quantity: u32) -> CartState {
    cart.add(self.product, quantity).await
  }

  pub async fn increment(&self, cart: &CartSynchronizer) -> CartState {
    cart.add(self.product, 1).await
  }

  /// Lowers the quantity by one; at 1 this removes the line.
  pub async fn decrement(&self, cart: &CartSynchronizer) -> CartState {
    cart.adjust_quantity(self.product.id, -1).await
  }

  pub async fn remove(&self, cart: &CartSynchronizer) -> CartState {
    cart.remove_from_cart(self.product.id).await
  }
}
