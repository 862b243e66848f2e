// src/lib.rs

//! Storefront: the client core of a small e-commerce storefront.
//!
//! It talks to a remote product/cart REST service and provides:
//!  - A catalog seam (`CatalogApi`) and a cart seam (`CartApi`), with a reqwest implementation.
//!  - A durable key/value store seam for the cart's `cartId`/`cartItems` keys.
//!  - `CartSynchronizer`, which applies optimistic cart edits, enforces stock
//!    ceilings, persists every transition and reconciles with the remote cart.
//!  - View models for the paginated product grid, the product page and recommendations.

pub mod api;
pub mod cart;
pub mod catalog;
pub mod error;
pub mod model;
pub mod storage;

// --- Re-exports for the Public API ---

pub use crate::api::{ApiConfig, CartApi, CatalogApi, HttpStorefrontApi};
pub use crate::cart::{CartSynchronizer, SyncStatus};
pub use crate::catalog::{
  load_recommendations, DetailState, ProductDetailPage, ProductListLoader, ProductListView, QuantityControls,
  RecommendationsState,
};
pub use crate::error::{StorefrontError, StorefrontResult};
pub use crate::model::{
  CartId, CartItem, CartState, LineRequest, Product, ProductDetail, ProductId, ProductPage, RemoteCart, RemoteCartLine,
};
pub use crate::storage::{CartStorage, DurableStore, JsonFileStore, MemoryStore};

/*
    Typical wiring:
    1. Build one `HttpStorefrontApi` and share it as both `Arc<dyn CatalogApi>` and `Arc<dyn CartApi>`.
    2. Open a `DurableStore` (e.g. `JsonFileStore::open(path)`).
    3. Construct `CartSynchronizer::new(cart_api, store)` at the application root and call `hydrate()` once.
    4. Hand `&CartSynchronizer` to the views that render quantity controls.
*/
