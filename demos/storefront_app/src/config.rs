// demos/storefront_app/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use storefront::api::http::DEFAULT_BASE_URL;
use storefront::catalog::{DEFAULT_PAGE_SIZE, DEFAULT_RECOMMENDATION_BATCH};
use storefront::ApiConfig;

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,

  // Remote product/cart service
  pub api_base_url: String,
  pub user_id: u64,

  /// Durable store file. Empty means keep the cart in memory only.
  pub store_path: Option<PathBuf>,

  pub page_size: u64,
  pub recommendation_batch: u64,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present

    let get_env = |var_name: &str| {
      env::var(var_name).map_err(|e| AppError::Config(format!("Missing environment variable '{}': {}", var_name, e)))
    };
    let parse_u64 = |var_name: &str, default: u64| -> Result<u64> {
      match get_env(var_name) {
        Ok(raw) => raw
          .trim()
          .parse::<u64>()
          .map_err(|e| AppError::Config(format!("Invalid {}: {}", var_name, e))),
        Err(_) => Ok(default),
      }
    };

    let server_host = get_env("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let server_port = get_env("SERVER_PORT")
      .unwrap_or_else(|_| "8080".to_string())
      .parse::<u16>()
      .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?;

    let api_base_url = get_env("STOREFRONT_API_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
    let user_id = parse_u64("STOREFRONT_USER_ID", 1)?;

    let store_path = match get_env("STOREFRONT_STORE_PATH") {
      Ok(raw) if raw.trim().is_empty() => None,
      Ok(raw) => Some(PathBuf::from(raw)),
      Err(_) => Some(PathBuf::from("storefront_session.json")),
    };

    let page_size = parse_u64("STOREFRONT_PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
    if page_size == 0 {
      return Err(AppError::Config("STOREFRONT_PAGE_SIZE must be positive".to_string()));
    }
    let recommendation_batch = parse_u64("STOREFRONT_RECOMMENDATION_BATCH", DEFAULT_RECOMMENDATION_BATCH)?;

    tracing::info!("Application configuration loaded successfully.");

    Ok(Self {
      server_host,
      server_port,
      api_base_url,
      user_id,
      store_path,
      page_size,
      recommendation_batch,
    })
  }

  pub fn api_config(&self) -> ApiConfig {
    ApiConfig {
      base_url: self.api_base_url.clone(),
      user_id: self.user_id,
    }
  }
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      server_host: "127.0.0.1".to_string(),
      server_port: 8080,
      api_base_url: DEFAULT_BASE_URL.to_string(),
      user_id: 1,
      store_path: None,
      page_size: DEFAULT_PAGE_SIZE,
      recommendation_batch: DEFAULT_RECOMMENDATION_BATCH,
    }
  }
}
