// demos/storefront_app/src/main.rs

mod config;
mod errors;
mod state;
mod web;

use crate::config::AppConfig;
use crate::errors::{AppError, Result as AppResult};
use crate::state::AppState;

use actix_web::{web as actix_data, App, HttpServer};
use std::sync::Arc;
use storefront::{DurableStore, HttpStorefrontApi, JsonFileStore, MemoryStore};
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

fn open_store(config: &AppConfig) -> AppResult<Arc<dyn DurableStore>> {
  match &config.store_path {
    Some(path) => {
      let store = JsonFileStore::open(path)?;
      tracing::info!(path = %path.display(), "Using file-backed cart store.");
      Ok(Arc::new(store))
    }
    None => {
      tracing::warn!("No store path configured; the cart will not survive a restart.");
      Ok(Arc::new(MemoryStore::new()))
    }
  }
}

fn startup_error(e: AppError) -> std::io::Error {
  tracing::error!(error = %e, "Startup failed.");
  std::io::Error::other(e.to_string())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  tracing_subscriber::fmt()
    .with_max_level(Level::INFO)
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .with_span_events(FmtSpan::CLOSE)
    .init();

  tracing::info!("Starting storefront server...");

  let app_config = Arc::new(AppConfig::from_env().map_err(startup_error)?);
  let store = open_store(&app_config).map_err(startup_error)?;
  let api = Arc::new(HttpStorefrontApi::new(app_config.api_config()));
  let app_state = AppState::new(api, store, app_config.clone());

  let restored = app_state.cart.hydrate().await;
  tracing::info!(
    cart_id = ?restored.cart_id(),
    total_quantity = restored.total_quantity(),
    "Cart restored."
  );

  let server_address = format!("{}:{}", app_config.server_host, app_config.server_port);
  tracing::info!("Attempting to bind server to {}...", server_address);

  let server_state = app_state.clone();
  let result = HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(server_state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(web::configure_app_routes)
  })
  .bind(&server_address)?
  .run()
  .await;

  // In-flight cart responses that land after shutdown are dropped.
  app_state.cart.dispose();
  tracing::info!("Storefront server stopped.");
  result
}
