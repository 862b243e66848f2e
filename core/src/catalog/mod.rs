// storefront/src/catalog/mod.rs

//! Read-side views over the catalog: the paginated grid, the product page and
//! the recommendations strip.

pub mod detail;
pub mod list;
pub mod recommendations;

pub use detail::{DetailState, ProductDetailPage, QuantityControls, PRODUCT_NOT_FOUND};
pub use list::{ProductListLoader, ProductListView, DEFAULT_PAGE_SIZE};
pub use recommendations::{
  load_recommendations, select_recommendations, RecommendationsState, DEFAULT_RECOMMENDATION_BATCH,
  MAX_RECOMMENDATIONS, NO_RECOMMENDATIONS,
};
