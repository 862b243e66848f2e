// storefront/src/model/cart.rs

//! Cart data: the client-side line items, the aggregate that the synchronizer
//! owns, and the wire shapes of the remote cart API.

use crate::model::product::ProductId;
use serde::{Deserialize, Serialize};

pub type CartId = u64;

/// A client-side cart line.
///
/// `stock` is the ceiling captured from catalog data when the line was
/// created; the remote cart API never reports it. `discounted_price` is the
/// post-discount line total as last reported by the remote API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
  pub id: ProductId,
  pub title: String,
  #[serde(default)]
  pub thumbnail: String,
  pub price: f64,
  pub quantity: u32,
  pub stock: u32,
  #[serde(default)]
  pub total: f64,
  #[serde(default)]
  pub discount_percentage: f64,
  #[serde(default)]
  pub discounted_price: f64,
}

impl CartItem {
  pub fn set_quantity(&mut self, quantity: u32) {
    self.quantity = quantity;
    self.total = self.price * f64::from(quantity);
  }
}

/// The cart aggregate. Lines keep insertion order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartState {
  items: Vec<CartItem>,
  total_quantity: u32,
  cart_id: Option<CartId>,
}

impl CartState {
  pub fn empty() -> Self {
    Self::default()
  }

  /// Builds a state from lines, dropping zero-quantity lines and deriving
  /// the total quantity.
  pub fn from_items(items: Vec<CartItem>, cart_id: Option<CartId>) -> Self {
    let mut state = CartState {
      items,
      total_quantity: 0,
      cart_id,
    };
    state.normalize();
    state
  }

  pub fn items(&self) -> &[CartItem] {
    &self.items
  }

  pub fn total_quantity(&self) -> u32 {
    self.total_quantity
  }

  pub fn cart_id(&self) -> Option<CartId> {
    self.cart_id
  }

  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  pub fn line(&self, product_id: ProductId) -> Option<&CartItem> {
    self.items.iter().find(|item| item.id == product_id)
  }

  /// Quantity currently in the cart for a product, 0 when absent.
  pub fn quantity_of(&self, product_id: ProductId) -> u32 {
    self.line(product_id).map_or(0, |item| item.quantity)
  }

  /// Sum of pre-discount line totals.
  pub fn subtotal(&self) -> f64 {
    self.items.iter().map(|item| item.total).sum()
  }

  /// Sum of remote-reported post-discount line totals.
  pub fn discounted_total(&self) -> f64 {
    self.items.iter().map(|item| item.discounted_price).sum()
  }

  /// The full line list in the shape the remote cart API expects.
  pub fn line_requests(&self) -> Vec<LineRequest> {
    self.items.iter().map(LineRequest::from).collect()
  }

  pub(crate) fn items_mut(&mut self) -> &mut Vec<CartItem> {
    &mut self.items
  }

  pub(crate) fn set_cart_id(&mut self, cart_id: Option<CartId>) {
    self.cart_id = cart_id;
  }

  /// Drops empty lines and recomputes `total_quantity`. Every mutation ends here.
  pub(crate) fn normalize(&mut self) {
    self.items.retain(|item| item.quantity > 0);
    self.total_quantity = self.items.iter().map(|item| item.quantity).sum();
  }
}

/// `{id, quantity}` pair sent to the remote cart API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRequest {
  pub id: ProductId,
  pub quantity: u32,
}

impl From<&CartItem> for LineRequest {
  fn from(item: &CartItem) -> Self {
    LineRequest {
      id: item.id,
      quantity: item.quantity,
    }
  }
}

/// A cart line as returned by the remote cart API. No stock field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteCartLine {
  pub id: ProductId,
  #[serde(default)]
  pub title: String,
  #[serde(default)]
  pub price: f64,
  pub quantity: u32,
  #[serde(default)]
  pub total: f64,
  #[serde(default)]
  pub discount_percentage: f64,
  #[serde(default, alias = "discountedTotal")]
  pub discounted_price: f64,
  #[serde(default)]
  pub thumbnail: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub stock: Option<u32>,
}

/// Response of create, fetch and replace cart calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteCart {
  pub id: CartId,
  pub products: Vec<RemoteCartLine>,
  #[serde(default)]
  pub total: Option<f64>,
  #[serde(default)]
  pub discounted_total: Option<f64>,
  #[serde(default)]
  pub total_quantity: Option<u32>,
}
