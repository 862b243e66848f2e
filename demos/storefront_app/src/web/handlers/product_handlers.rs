// demos/storefront_app/src/web/handlers/product_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::state::AppState;
use storefront::{load_recommendations, DetailState, ProductDetailPage, ProductId, ProductListView, RecommendationsState};

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct FeedResponse {
  pub fetched: bool,
  #[serde(flatten)]
  pub view: ProductListView,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ControlsView {
  pub quantity: u32,
  pub can_increment: bool,
  pub can_decrement: bool,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct DetailResponse {
  #[serde(flatten)]
  pub page: ProductDetailPage,
  pub controls: Option<ControlsView>,
}

fn feed_response(fetched: bool, view: ProductListView) -> HttpResponse {
  let body = FeedResponse { fetched, view };
  if body.view.error.is_some() {
    HttpResponse::BadGateway().json(body)
  } else {
    HttpResponse::Ok().json(body)
  }
}

/// Resets the shared feed and returns its first page.
#[instrument(name = "handler::list_products", skip(app_state))]
pub async fn list_products_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let mut feed = app_state.feed.lock().await;
  if let Err(e) = feed.load_initial().await {
    warn!(error = %e, "Initial product page failed.");
  }
  let view = feed.view();
  info!(loaded = view.products.len(), total = view.total, "Product feed reset.");
  Ok(feed_response(true, view))
}

/// The sentinel scrolled into view: append the next page if there is one.
#[instrument(name = "handler::next_page", skip(app_state))]
pub async fn next_page_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let mut feed = app_state.feed.lock().await;
  let fetched = feed.on_sentinel_visible().await;
  Ok(feed_response(fetched, feed.view()))
}

#[instrument(name = "handler::get_product", skip(app_state, path), fields(product_id = %path.as_ref()))]
pub async fn get_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<ProductId>,
) -> Result<HttpResponse, AppError> {
  let product_id = path.into_inner();
  let cart = app_state.cart.as_ref();
  let page = ProductDetailPage::load(app_state.catalog.as_ref(), cart, product_id).await;

  let controls = page.controls().map(|controls| {
    let quantity = cart.quantity_of(product_id);
    ControlsView {
      quantity,
      can_increment: controls.can_increment(cart),
      can_decrement: quantity > 0 && !cart.is_loading(),
    }
  });
  let mut response = match page.state {
    DetailState::Found { .. } => HttpResponse::Ok(),
    DetailState::NotFound { .. } => HttpResponse::NotFound(),
    DetailState::Failed { .. } => HttpResponse::BadGateway(),
  };
  Ok(response.json(DetailResponse { page, controls }))
}

#[instrument(name = "handler::recommendations", skip(app_state, path), fields(product_id = %path.as_ref()))]
pub async fn recommendations_handler(
  app_state: web::Data<AppState>,
  path: web::Path<ProductId>,
) -> Result<HttpResponse, AppError> {
  let current = path.into_inner();
  let state = load_recommendations(
    app_state.catalog.as_ref(),
    Some(current),
    app_state.config.recommendation_batch,
  )
  .await;
  match state {
    RecommendationsState::Failed { .. } => Ok(HttpResponse::BadGateway().json(state)),
    _ => Ok(HttpResponse::Ok().json(state)),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::web::configure_app_routes;
  use crate::web::handlers::test_support::{app_state, product, StubBackend};
  use actix_web::{http::StatusCode, test, App};
  use serde_json::Value;
  use std::sync::Arc;

  fn catalog(n: u64) -> Arc<StubBackend> {
    Arc::new(StubBackend::new((1..=n).map(|id| product(id, 10.0, 3)).collect()))
  }

  #[actix_web::test]
  async fn test_feed_pages_until_exhausted() {
    let state = app_state(catalog(3));
    let app = test::init_service(App::new().app_data(web::Data::new(state)).configure(configure_app_routes)).await;

    let req = test::TestRequest::get().uri("/api/v1/products").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["products"].as_array().unwrap().len(), 2);
    assert_eq!(body["hasMore"], true);

    let req = test::TestRequest::post().uri("/api/v1/products/next").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["fetched"], true);
    assert_eq!(body["products"].as_array().unwrap().len(), 3);
    assert_eq!(body["endOfResults"], true);

    let req = test::TestRequest::post().uri("/api/v1/products/next").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["fetched"], false);
  }

  #[actix_web::test]
  async fn test_feed_failure_is_bad_gateway() {
    let backend = catalog(3);
    backend.fail_catalog(Some(503));
    let state = app_state(backend);
    let app = test::init_service(App::new().app_data(web::Data::new(state)).configure(configure_app_routes)).await;

    let req = test::TestRequest::get().uri("/api/v1/products").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Failed to fetch products: Service Unavailable");
  }

  #[actix_web::test]
  async fn test_detail_states_map_to_status_codes() {
    let backend = catalog(2);
    let state = app_state(backend.clone());
    let app = test::init_service(App::new().app_data(web::Data::new(state)).configure(configure_app_routes)).await;

    let req = test::TestRequest::get().uri("/api/v1/products/2").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["state"], "found");
    assert_eq!(body["controls"]["quantity"], 0);
    assert_eq!(body["controls"]["canIncrement"], true);

    let req = test::TestRequest::get().uri("/api/v1/products/99").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Product Not Found");
    assert!(body["controls"].is_null());

    backend.fail_catalog(Some(503));
    let req = test::TestRequest::get().uri("/api/v1/products/2").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
  }

  #[actix_web::test]
  async fn test_recommendations_skip_current_product() {
    let state = app_state(catalog(6));
    let app = test::init_service(App::new().app_data(web::Data::new(state)).configure(configure_app_routes)).await;

    let req = test::TestRequest::get().uri("/api/v1/products/1/recommendations").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["state"], "ready");
    let ids: Vec<u64> = body["products"]
      .as_array()
      .unwrap()
      .iter()
      .map(|p| p["id"].as_u64().unwrap())
      .collect();
    assert_eq!(ids, vec![2, 3, 4, 5]);
  }
}
