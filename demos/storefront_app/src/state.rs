// demos/storefront_app/src/state.rs
use crate::config::AppConfig;
use std::sync::Arc;
use storefront::{CartApi, CartSynchronizer, CatalogApi, DurableStore, ProductListLoader};
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
  pub catalog: Arc<dyn CatalogApi>,
  pub cart: Arc<CartSynchronizer>,
  // One shared product feed; scrolling is serialized on this lock.
  pub feed: Arc<Mutex<ProductListLoader>>,
  pub config: Arc<AppConfig>,
}

impl AppState {
  /// Wires the views and the cart synchronizer over one backend that serves
  /// both the catalog and the cart endpoints.
  pub fn new<A>(api: Arc<A>, store: Arc<dyn DurableStore>, config: Arc<AppConfig>) -> Self
  where
    A: CatalogApi + CartApi,
  {
    let catalog: Arc<dyn CatalogApi> = api.clone();
    let cart_api: Arc<dyn CartApi> = api;
    Self {
      feed: Arc::new(Mutex::new(ProductListLoader::new(catalog.clone(), config.page_size))),
      cart: Arc::new(CartSynchronizer::new(cart_api, store)),
      catalog,
      config,
    }
  }
}
