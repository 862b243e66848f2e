// demos/storefront_app/src/web/handlers/cart_handlers.rs

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::state::AppState;
use storefront::{CartId, CartItem, CartState, ProductId, StorefrontError, SyncStatus};

// --- Request DTOs ---

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequestPayload {
  pub product_id: ProductId,
  #[serde(default = "default_quantity")]
  pub quantity: u32,
}

fn default_quantity() -> u32 {
  1
}

#[derive(Deserialize, Debug)]
pub struct UpdateQuantityPayload {
  // Zero or negative removes the line.
  pub quantity: i64,
}

// --- Response DTO ---

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
  pub cart_id: Option<CartId>,
  pub items: Vec<CartItem>,
  pub total_quantity: u32,
  pub subtotal: f64,
  pub discounted_total: f64,
  pub loading: bool,
  pub sync: SyncStatus,
}

impl CartView {
  fn render(app_state: &AppState, cart: &CartState) -> Self {
    Self {
      cart_id: cart.cart_id(),
      items: cart.items().to_vec(),
      total_quantity: cart.total_quantity(),
      subtotal: cart.subtotal(),
      discounted_total: cart.discounted_total(),
      loading: app_state.cart.is_loading(),
      sync: app_state.cart.sync_status(),
    }
  }
}

fn cart_response(app_state: &AppState, cart: &CartState) -> HttpResponse {
  HttpResponse::Ok().json(CartView::render(app_state, cart))
}

fn require_line(app_state: &AppState, product_id: ProductId) -> Result<(), AppError> {
  if app_state.cart.quantity_of(product_id) == 0 {
    return Err(StorefrontError::not_found(format!("product {product_id} in cart")).into());
  }
  Ok(())
}

// --- Handler Implementation ---

#[instrument(name = "handler::get_cart", skip(app_state))]
pub async fn get_cart_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let cart = app_state.cart.snapshot();
  Ok(cart_response(&app_state, &cart))
}

#[instrument(
    name = "handler::add_to_cart",
    skip(app_state, req_payload),
    fields(product_id = %req_payload.product_id, quantity = %req_payload.quantity)
)]
pub async fn add_to_cart_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<AddToCartRequestPayload>,
) -> Result<HttpResponse, AppError> {
  if req_payload.quantity == 0 {
    return Err(AppError::Validation("quantity must be at least 1".to_string()));
  }

  // Stock and price come from the catalog, never from the client.
  let detail = app_state.catalog.get_product(req_payload.product_id).await?;
  let cart = app_state.cart.add(&detail.product, req_payload.quantity).await;

  info!(
    "Product {} now at quantity {} in cart {:?}",
    req_payload.product_id,
    cart.quantity_of(req_payload.product_id),
    cart.cart_id()
  );
  Ok(cart_response(&app_state, &cart))
}

#[instrument(name = "handler::update_quantity", skip(app_state, path, req_payload), fields(product_id = %path.as_ref()))]
pub async fn update_quantity_handler(
  app_state: web::Data<AppState>,
  path: web::Path<ProductId>,
  req_payload: web::Json<UpdateQuantityPayload>,
) -> Result<HttpResponse, AppError> {
  let product_id = path.into_inner();
  require_line(&app_state, product_id)?;
  let cart = app_state.cart.update_quantity(product_id, req_payload.quantity).await;
  Ok(cart_response(&app_state, &cart))
}

#[instrument(name = "handler::remove_from_cart", skip(app_state, path), fields(product_id = %path.as_ref()))]
pub async fn remove_from_cart_handler(
  app_state: web::Data<AppState>,
  path: web::Path<ProductId>,
) -> Result<HttpResponse, AppError> {
  let product_id = path.into_inner();
  require_line(&app_state, product_id)?;
  let cart = app_state.cart.remove_from_cart(product_id).await;
  Ok(cart_response(&app_state, &cart))
}

#[instrument(name = "handler::clear_cart", skip(app_state))]
pub async fn clear_cart_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let cart = app_state.cart.clear_cart().await;
  Ok(cart_response(&app_state, &cart))
}

#[instrument(name = "handler::revalidate_stock", skip(app_state, path), fields(product_id = %path.as_ref()))]
pub async fn revalidate_stock_handler(
  app_state: web::Data<AppState>,
  path: web::Path<ProductId>,
) -> Result<HttpResponse, AppError> {
  let product_id = path.into_inner();
  require_line(&app_state, product_id)?;
  let cart = app_state
    .cart
    .revalidate_stock(app_state.catalog.as_ref(), product_id)
    .await;
  Ok(cart_response(&app_state, &cart))
}
