// storefront/src/catalog/recommendations.rs

use crate::api::CatalogApi;
use crate::model::{Product, ProductId};
use serde::Serialize;
use tracing::{event, instrument, Level};

pub const MAX_RECOMMENDATIONS: usize = 4;
pub const DEFAULT_RECOMMENDATION_BATCH: u64 = 10;
pub const NO_RECOMMENDATIONS: &str = "No recommendations available.";

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RecommendationsState {
  #[default]
  Loading,
  Failed { message: String },
  /// Nothing to show, either because the batch was empty or because
  /// filtering removed everything.
  Empty { message: String },
  Ready { products: Vec<Product> },
}

/// Drops the current product (when given) and keeps the first
/// `MAX_RECOMMENDATIONS` of the rest, in batch order.
pub fn select_recommendations(batch: Vec<Product>, current: Option<ProductId>) -> Vec<Product> {
  batch
    .into_iter()
    .filter(|product| Some(product.id) != current)
    .take(MAX_RECOMMENDATIONS)
    .collect()
}

#[instrument(name = "load_recommendations", skip(catalog))]
pub async fn load_recommendations(catalog: &dyn CatalogApi, current: Option<ProductId>, batch: u64) -> RecommendationsState {
  match catalog.list_products(batch, 0).await {
    Ok(page) => {
      let products = select_recommendations(page.products, current);
      if products.is_empty() {
        RecommendationsState::Empty {
          message: NO_RECOMMENDATIONS.to_string(),
        }
      } else {
        RecommendationsState::Ready { products }
      }
    }
    Err(e) => {
      event!(Level::ERROR, error = %e, "Failed to fetch recommendations.");
      RecommendationsState::Failed {
        message: format!("Failed to load recommendations: {}", e.status_text()),
      }
    }
  }
}
