// demos/storefront_app/src/errors.rs

use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use storefront::StorefrontError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Storefront Error: {source}")]
  Storefront {
    #[from]
    source: StorefrontError,
  },
}

impl ResponseError for AppError {
  fn error_response(&self) -> HttpResponse {
    // Log the full error when it's turned into a response
    tracing::error!(application_error = %self, "Responding with error");
    match self {
      AppError::Validation(m) => HttpResponse::BadRequest().json(json!({"error": m})),
      AppError::Config(m) => {
        HttpResponse::InternalServerError().json(json!({"error": "Configuration issue", "detail": m}))
      }
      AppError::Storefront { source } => match source {
        StorefrontError::NotFound { resource } => {
          HttpResponse::NotFound().json(json!({"error": "Not found", "detail": resource}))
        }
        StorefrontError::Misuse(m) => HttpResponse::BadRequest().json(json!({"error": m})),
        StorefrontError::Http { .. } | StorefrontError::Transport { .. } | StorefrontError::MalformedResponse { .. } => {
          HttpResponse::BadGateway().json(json!({"error": "Upstream catalog error", "detail": source.status_text()}))
        }
        other => {
          HttpResponse::InternalServerError().json(json!({"error": "An internal error occurred", "detail": other.to_string()}))
        }
      },
    }
  }
}

// Define a Result type alias for the application
pub type Result<T, E = AppError> = std::result::Result<T, E>;
