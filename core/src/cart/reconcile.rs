// storefront/src/cart/reconcile.rs

//! Pure transformations on `CartState`. The synchronizer applies these
//! optimistically, then reconciles with the remote cart via `adopt_remote`.
//!
//! Every function here leaves the state normalized: no zero-quantity lines,
//! no line above its stock ceiling, `total_quantity` equal to the line sum.

use crate::model::{CartItem, CartState, Product, ProductId, RemoteCart, RemoteCartLine};
use tracing::{event, Level};

/// Ceiling used for a remote line when neither local data nor the remote
/// response says anything about its stock.
pub const DEFAULT_STOCK_CEILING: u32 = 100;

/// Clamps `requested` into `[floor, stock]`. A stock of 0 always yields 0.
pub fn clamp_quantity(requested: i64, floor: u32, stock: u32) -> u32 {
  if stock == 0 {
    return 0;
  }
  let upper = i64::from(stock);
  requested.clamp(i64::from(floor.min(stock)), upper) as u32
}

/// A fresh cart line for `product`, with the product's stock as its ceiling.
pub fn line_from_product(product: &Product, quantity: u32) -> CartItem {
  let mut item = CartItem {
    id: product.id,
    title: product.title.clone(),
    thumbnail: product.thumbnail.clone(),
    price: product.price,
    quantity: 0,
    stock: product.stock,
    total: 0.0,
    discount_percentage: product.discount_percentage,
    discounted_price: 0.0,
  };
  item.set_quantity(quantity);
  item.discounted_price = product.discounted_price() * f64::from(quantity);
  item
}

/// Adds `delta` units of `product`, clamped to `[0, stock]`. An existing line
/// keeps its recorded ceiling. Returns the resulting quantity of the line
/// (0 when the line is gone or was never created).
pub fn apply_add(state: &mut CartState, product: &Product, delta: u32) -> u32 {
  let items = state.items_mut();
  let resulting = match items.iter_mut().find(|item| item.id == product.id) {
    Some(existing) => {
      let requested = i64::from(existing.quantity) + i64::from(delta);
      let quantity = clamp_quantity(requested, 0, existing.stock);
      existing.set_quantity(quantity);
      quantity
    }
    None => {
      let quantity = clamp_quantity(i64::from(delta), 0, product.stock);
      if quantity > 0 {
        items.push(line_from_product(product, quantity));
      }
      quantity
    }
  };
  state.normalize();
  resulting
}

/// Sets a line's quantity. `requested <= 0` removes the line; otherwise the
/// quantity is clamped to `[1, stock]`. Returns `None` when no line exists.
pub fn apply_set_quantity(state: &mut CartState, product_id: ProductId, requested: i64) -> Option<u32> {
  let line = state.items_mut().iter_mut().find(|item| item.id == product_id)?;
  let quantity = if requested <= 0 {
    0
  } else {
    clamp_quantity(requested, 1, line.stock)
  };
  line.set_quantity(quantity);
  state.normalize();
  Some(quantity)
}

/// Removes a line. Returns whether it existed.
pub fn apply_remove(state: &mut CartState, product_id: ProductId) -> bool {
  let before = state.items().len();
  state.items_mut().retain(|item| item.id != product_id);
  state.normalize();
  state.items().len() != before
}

/// Replaces a line's stock ceiling with fresh catalog data, lowering the
/// quantity if it no longer fits. Returns `Some(changed_quantity)` when the
/// line exists.
pub fn apply_stock(state: &mut CartState, product_id: ProductId, stock: u32) -> Option<bool> {
  let line = state.items_mut().iter_mut().find(|item| item.id == product_id)?;
  line.stock = stock;
  let changed = line.quantity > stock;
  if changed {
    line.set_quantity(stock);
  }
  state.normalize();
  Some(changed)
}

fn stock_for(line: &RemoteCartLine, known: &[CartItem]) -> u32 {
  known
    .iter()
    .find(|item| item.id == line.id)
    .map(|item| item.stock)
    .or(line.stock)
    .unwrap_or(DEFAULT_STOCK_CEILING)
}

/// A remote cart mapped onto local lines.
#[derive(Debug, Clone, PartialEq)]
pub struct Adoption {
  pub state: CartState,
  /// Some remote quantity was above its stock ceiling and was lowered, so the
  /// remote cart no longer matches `state`.
  pub clamped: bool,
}

/// Maps an authoritative remote cart onto local lines.
///
/// Quantities and discounted totals come from the server; stock ceilings come
/// from `known` (the local list in effect before the remote call), then the
/// remote line's own stock, then `DEFAULT_STOCK_CEILING`.
pub fn adopt_remote(remote: &RemoteCart, known: &[CartItem]) -> Adoption {
  let mut clamped = false;
  let items = remote
    .products
    .iter()
    .map(|line| {
      let stock = stock_for(line, known);
      let quantity = line.quantity.min(stock);
      if quantity != line.quantity {
        clamped = true;
        event!(
          Level::WARN,
          product_id = line.id,
          remote_quantity = line.quantity,
          stock,
          "Remote quantity exceeds the known stock ceiling; clamping."
        );
      }
      let thumbnail = if line.thumbnail.is_empty() {
        known
          .iter()
          .find(|item| item.id == line.id)
          .map(|item| item.thumbnail.clone())
          .unwrap_or_default()
      } else {
        line.thumbnail.clone()
      };
      CartItem {
        id: line.id,
        title: line.title.clone(),
        thumbnail,
        price: line.price,
        quantity,
        stock,
        total: line.total,
        discount_percentage: line.discount_percentage,
        discounted_price: line.discounted_price,
      }
    })
    .collect();

  let state = CartState::from_items(items, Some(remote.id));
  if let Some(reported) = remote.total_quantity {
    if reported != state.total_quantity() {
      event!(
        Level::DEBUG,
        cart_id = remote.id,
        reported,
        computed = state.total_quantity(),
        "Remote total quantity differs from the line sum; using the line sum."
      );
    }
  }
  Adoption { state, clamped }
}
