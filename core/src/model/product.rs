// storefront/src/model/product.rs

//! Catalog entities as returned by the remote product API.
//! Read-only snapshots of server truth at fetch time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type ProductId = u64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
  pub id: ProductId,
  pub title: String,
  #[serde(default)]
  pub description: String,
  pub price: f64,
  #[serde(default)]
  pub discount_percentage: f64,
  #[serde(default)]
  pub rating: f64,
  pub stock: u32,
  // Some catalog entries (groceries) carry no brand.
  #[serde(default)]
  pub brand: Option<String>,
  #[serde(default)]
  pub category: String,
  #[serde(default)]
  pub thumbnail: String,
  #[serde(default)]
  pub images: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Dimensions {
  pub width: f64,
  pub height: f64,
  pub depth: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
  pub rating: u8,
  pub comment: String,
  pub date: DateTime<Utc>,
  pub reviewer_name: String,
  pub reviewer_email: String,
}

/// A single product with the fields only the detail endpoint returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
  #[serde(flatten)]
  pub product: Product,
  #[serde(default)]
  pub tags: Vec<String>,
  #[serde(default)]
  pub weight: f64,
  #[serde(default)]
  pub dimensions: Dimensions,
  #[serde(default)]
  pub shipping_information: String,
  #[serde(default)]
  pub warranty_information: String,
  #[serde(default)]
  pub return_policy: String,
  #[serde(default)]
  pub reviews: Vec<Review>,
}

/// One page of `GET /products?limit=N&skip=M`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPage {
  pub products: Vec<Product>,
  pub total: u64,
  #[serde(default)]
  pub skip: u64,
  #[serde(default)]
  pub limit: u64,
}

impl Product {
  /// Unit price after the catalog discount, rounded to cents.
  pub fn discounted_price(&self) -> f64 {
    let raw = self.price * (1.0 - self.discount_percentage / 100.0);
    (raw * 100.0).round() / 100.0
  }
}
