// storefront/src/api/http.rs

//! reqwest-backed implementation of the catalog and cart API seams.

use crate::api::{CartApi, CatalogApi};
use crate::error::{StorefrontError, StorefrontResult};
use crate::model::{CartId, LineRequest, ProductDetail, ProductId, ProductPage, RemoteCart};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{event, instrument, Level};

pub const DEFAULT_BASE_URL: &str = "https://dummyjson.com";

#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  /// Owner of carts created by this client.
  pub user_id: u64,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      base_url: DEFAULT_BASE_URL.to_string(),
      user_id: 1,
    }
  }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateCartBody<'a> {
  user_id: u64,
  products: &'a [LineRequest],
}

#[derive(Serialize)]
struct ReplaceCartBody<'a> {
  merge: bool,
  products: &'a [LineRequest],
}

#[derive(Debug, Clone)]
pub struct HttpStorefrontApi {
  client: Client,
  config: ApiConfig,
}

impl HttpStorefrontApi {
  pub fn new(config: ApiConfig) -> Self {
    Self::with_client(Client::new(), config)
  }

  pub fn with_client(client: Client, config: ApiConfig) -> Self {
    Self { client, config }
  }

  pub fn config(&self) -> &ApiConfig {
    &self.config
  }

  fn url(&self, path: &str) -> String {
    join_url(&self.config.base_url, path)
  }

  /// Sends the request and decodes a JSON body, mapping status codes onto the
  /// storefront error taxonomy.
  async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder, resource: &str) -> StorefrontResult<T> {
    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
      event!(Level::WARN, %status, resource, "Remote API returned a non-success status.");
      return Err(status_error(status, resource));
    }
    let body = response.bytes().await?;
    decode_body(&body, resource)
  }
}

pub(crate) fn join_url(base_url: &str, path: &str) -> String {
  format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}

pub(crate) fn status_error(status: StatusCode, resource: &str) -> StorefrontError {
  if status == StatusCode::NOT_FOUND {
    return StorefrontError::not_found(resource);
  }
  StorefrontError::Http {
    status: status.as_u16(),
    status_text: status.canonical_reason().unwrap_or_default().to_string(),
  }
}

pub(crate) fn decode_body<T: DeserializeOwned>(body: &[u8], resource: &str) -> StorefrontResult<T> {
  serde_json::from_slice(body).map_err(|source| StorefrontError::MalformedResponse {
    context: resource.to_string(),
    source,
  })
}

#[async_trait]
impl CatalogApi for HttpStorefrontApi {
  #[instrument(name = "HttpStorefrontApi::list_products", skip(self), err(Display))]
  async fn list_products(&self, limit: u64, skip: u64) -> StorefrontResult<ProductPage> {
    let request = self
      .client
      .get(self.url("products"))
      .query(&[("limit", limit), ("skip", skip)]);
    self.send_json(request, "product list").await
  }

  #[instrument(name = "HttpStorefrontApi::get_product", skip(self), err(Display))]
  async fn get_product(&self, id: ProductId) -> StorefrontResult<ProductDetail> {
    let request = self.client.get(self.url(&format!("products/{id}")));
    self.send_json(request, &format!("product {id}")).await
  }
}

#[async_trait]
impl CartApi for HttpStorefrontApi {
  #[instrument(name = "HttpStorefrontApi::create_cart", skip(self, lines), fields(lines = lines.len()), err(Display))]
  async fn create_cart(&self, lines: &[LineRequest]) -> StorefrontResult<RemoteCart> {
    let body = CreateCartBody {
      user_id: self.config.user_id,
      products: lines,
    };
    let request = self.client.post(self.url("carts/add")).json(&body);
    self.send_json(request, "new cart").await
  }

  #[instrument(name = "HttpStorefrontApi::fetch_cart", skip(self), err(Display))]
  async fn fetch_cart(&self, id: CartId) -> StorefrontResult<RemoteCart> {
    let request = self.client.get(self.url(&format!("carts/{id}")));
    self.send_json(request, &format!("cart {id}")).await
  }

  #[instrument(name = "HttpStorefrontApi::replace_cart", skip(self, lines), fields(lines = lines.len()), err(Display))]
  async fn replace_cart(&self, id: CartId, lines: &[LineRequest]) -> StorefrontResult<RemoteCart> {
    let body = ReplaceCartBody {
      merge: false,
      products: lines,
    };
    let request = self.client.put(self.url(&format!("carts/{id}"))).json(&body);
    self.send_json(request, &format!("cart {id}")).await
  }
}
