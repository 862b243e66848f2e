// storefront/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorefrontError {
  #[error("Resource not found: {resource}")]
  NotFound { resource: String },

  #[error("Remote API responded with {status} {status_text}")]
  Http { status: u16, status_text: String },

  #[error("Remote API request failed. Source: {source}")]
  Transport {
    #[source]
    source: AnyhowError,
  },

  #[error("Malformed response for {context}. Source: {source}")]
  MalformedResponse {
    context: String,
    #[source]
    source: serde_json::Error,
  },

  #[error("Durable store error for key '{key}': {message}")]
  Storage { key: String, message: String },

  #[error("Serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("Invalid cart operation: {0}")]
  Misuse(String),

  #[error("Internal storefront error: {0}")]
  Internal(String),
}

impl StorefrontError {
  pub fn not_found(resource: impl Into<String>) -> Self {
    StorefrontError::NotFound {
      resource: resource.into(),
    }
  }

  pub fn is_not_found(&self) -> bool {
    matches!(self, StorefrontError::NotFound { .. })
  }

  /// Short human-readable status, used where a view shows the failure inline.
  pub fn status_text(&self) -> String {
    match self {
      StorefrontError::NotFound { .. } => "Not Found".to_string(),
      StorefrontError::Http { status, status_text } if status_text.is_empty() => status.to_string(),
      StorefrontError::Http { status_text, .. } => status_text.clone(),
      StorefrontError::Transport { source } => source.to_string(),
      StorefrontError::MalformedResponse { .. } => "Malformed response".to_string(),
      other => other.to_string(),
    }
  }
}

impl From<AnyhowError> for StorefrontError {
  fn from(err: AnyhowError) -> Self {
    StorefrontError::Transport { source: err }
  }
}

impl From<reqwest::Error> for StorefrontError {
  fn from(err: reqwest::Error) -> Self {
    StorefrontError::Transport { source: err.into() }
  }
}

pub type StorefrontResult<T, E = StorefrontError> = std::result::Result<T, E>;
