//! Food/region API client with timeout, bounded retry and a GET cache.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::error::ApiError;
use super::transport::{HttpMethod, HttpRequest, HttpResponse, ReqwestTransport, Transport, TransportError};
use super::types::{
  ApiNlpResponse, ApiPayload, FoodId, FoodInput, NlpContext, NlpKind, NlpRequest, NlpResponse,
  RegionId, RegionInput,
};
use crate::cache::{cache_key, MemoryStorage, NoopStorage, ResponseCache};
use crate::config::ApiConfig;

/// Options for a single request. Absent fields take their defaults:
/// GET, no extra headers, no body.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RequestOptions {
  pub method: HttpMethod,
  #[serde(skip_serializing_if = "BTreeMap::is_empty")]
  pub headers: BTreeMap<String, String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub body: Option<Value>,
}

impl RequestOptions {
  pub fn get() -> Self {
    Self::default()
  }

  pub fn post(body: Value) -> Self {
    Self {
      method: HttpMethod::Post,
      body: Some(body),
      ..Default::default()
    }
  }

  pub fn put(body: Value) -> Self {
    Self {
      method: HttpMethod::Put,
      body: Some(body),
      ..Default::default()
    }
  }

  pub fn delete() -> Self {
    Self {
      method: HttpMethod::Delete,
      ..Default::default()
    }
  }

  pub fn with_header(mut self, name: &str, value: &str) -> Self {
    self.headers.insert(name.to_string(), value.to_string());
    self
  }

  fn is_get(&self) -> bool {
    self.method == HttpMethod::Get
  }
}

/// Client for the remote food service.
///
/// Cheap to clone; clones share the transport and the response cache.
#[derive(Clone)]
pub struct ApiService {
  base_url: String,
  transport: Arc<dyn Transport>,
  cache: ResponseCache,
  timeout: Duration,
  max_retries: u32,
  retry_delay: Duration,
}

impl ApiService {
  pub fn new(config: &ApiConfig) -> Self {
    Self::with_transport(config, ReqwestTransport::new())
  }

  pub fn with_transport(config: &ApiConfig, transport: impl Transport + 'static) -> Self {
    let cache = if config.cache_enabled {
      ResponseCache::new(MemoryStorage::new())
    } else {
      ResponseCache::new(NoopStorage)
    };

    Self {
      base_url: config.base_url.trim_end_matches('/').to_string(),
      transport: Arc::new(transport),
      cache: cache.with_stale_time(config.cache_ttl()),
      timeout: config.timeout(),
      max_retries: config.max_retries,
      retry_delay: config.retry_delay(),
    }
  }

  #[allow(dead_code)]
  pub fn with_timeout(mut self, timeout: Duration) -> Self {
    self.timeout = timeout;
    self
  }

  #[allow(dead_code)]
  pub fn with_retry_delay(mut self, delay: Duration) -> Self {
    self.retry_delay = delay;
    self
  }

  #[allow(dead_code)]
  pub fn with_cache_ttl(mut self, ttl: chrono::Duration) -> Self {
    self.cache = self.cache.with_stale_time(ttl);
    self
  }

  pub fn base_url(&self) -> &str {
    &self.base_url
  }

  /// Perform a request against `endpoint` (a path below the base URL).
  ///
  /// GET requests are served from cache when a fresh entry exists and
  /// never return `Err`: any failure becomes the fallback payload with
  /// `success: false`. Other methods propagate their errors.
  pub async fn request(&self, endpoint: &str, options: RequestOptions) -> Result<Value, ApiError> {
    let key = cache_key(endpoint, &options);

    if options.is_get() {
      if let Some(cached) = self.cache.get(&key) {
        debug!("Using cached data for {}", endpoint);
        return Ok(cached);
      }
    }

    match self.execute(endpoint, &options).await {
      Ok(data) => {
        if options.is_get() {
          self.cache.put(&key, data.clone());
        }
        Ok(data)
      }
      Err(e) => {
        error!("API request failed: {}", e);
        if options.is_get() {
          warn!("Returning fallback data for {}", endpoint);
          Ok(ApiPayload::fallback_value(&e.to_string()))
        } else {
          Err(e)
        }
      }
    }
  }

  async fn execute(&self, endpoint: &str, options: &RequestOptions) -> Result<Value, ApiError> {
    let url = format!("{}{}", self.base_url, endpoint);

    let mut headers = BTreeMap::new();
    headers.insert("Content-Type".to_string(), "application/json".to_string());
    headers.extend(options.headers.clone());

    let body = match &options.body {
      Some(body) => Some(serde_json::to_string(body)?),
      None => None,
    };

    info!("Fetching {} {}", options.method, url);
    let response = self
      .fetch_with_retry(HttpRequest {
        method: options.method,
        url,
        headers,
        body,
      })
      .await?;

    if !response.is_success() {
      return Err(ApiError::Status(response.status));
    }

    let data: Value = serde_json::from_str(&response.body)?;
    debug!("Successfully fetched data from {}", endpoint);
    Ok(data)
  }

  /// Send with a per-attempt timeout. Only timeouts are retried.
  async fn fetch_with_retry(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
    let mut attempt = 0;
    loop {
      attempt += 1;
      let outcome = tokio::time::timeout(self.timeout, self.transport.send(request.clone())).await;

      match outcome {
        Ok(Ok(response)) => return Ok(response),
        Ok(Err(TransportError::Other(msg))) => return Err(ApiError::Transport(msg)),
        Ok(Err(TransportError::Timeout)) | Err(_) => {
          if attempt > self.max_retries {
            return Err(ApiError::Timeout { attempts: attempt });
          }
          warn!(
            "Request timeout, retrying... ({}/{})",
            attempt, self.max_retries
          );
          tokio::time::sleep(self.retry_delay).await;
        }
      }
    }
  }

  async fn get_payload(&self, endpoint: &str) -> ApiPayload {
    match self.request(endpoint, RequestOptions::get()).await {
      Ok(value) => ApiPayload::from_value(value),
      Err(e) => ApiPayload::fallback(e.to_string()),
    }
  }

  async fn send_payload(&self, endpoint: &str, options: RequestOptions) -> Result<ApiPayload, ApiError> {
    let value = self.request(endpoint, options).await?;
    Ok(serde_json::from_value(value)?)
  }

  /// Empty the whole response cache.
  pub fn clear_cache(&self) {
    self.cache.clear();
  }

  // Region endpoints

  pub async fn get_regions(&self) -> ApiPayload {
    self.get_payload("/regions").await
  }

  pub async fn get_region_by_id(&self, id: RegionId) -> ApiPayload {
    self.get_payload(&format!("/regions/{}", id)).await
  }

  pub async fn create_region(&self, region: &RegionInput) -> Result<ApiPayload, ApiError> {
    let body = serde_json::to_value(region)?;
    self.send_payload("/regions", RequestOptions::post(body)).await
  }

  pub async fn update_region(&self, id: RegionId, region: &RegionInput) -> Result<ApiPayload, ApiError> {
    let body = serde_json::to_value(region)?;
    self
      .send_payload(&format!("/regions/{}", id), RequestOptions::put(body))
      .await
  }

  pub async fn delete_region(&self, id: RegionId) -> Result<ApiPayload, ApiError> {
    self
      .send_payload(&format!("/regions/{}", id), RequestOptions::delete())
      .await
  }

  // Category endpoints

  pub async fn get_categories(&self) -> ApiPayload {
    self.get_payload("/categories").await
  }

  pub async fn get_category_by_id(&self, id: i64) -> ApiPayload {
    self.get_payload(&format!("/categories/{}", id)).await
  }

  // Food endpoints

  pub async fn get_foods_by_region(&self, region_id: RegionId) -> ApiPayload {
    self
      .get_payload(&format!("/regions/{}/foods", region_id))
      .await
  }

  pub async fn get_foods_by_category(&self, category_id: i64) -> ApiPayload {
    self
      .get_payload(&format!("/categories/{}/foods", category_id))
      .await
  }

  pub async fn create_food(&self, food: &FoodInput) -> Result<ApiPayload, ApiError> {
    let body = serde_json::to_value(food)?;
    self.send_payload("/foods", RequestOptions::post(body)).await
  }

  pub async fn update_food(&self, id: FoodId, food: &FoodInput) -> Result<ApiPayload, ApiError> {
    let body = serde_json::to_value(food)?;
    self
      .send_payload(&format!("/foods/{}", id), RequestOptions::put(body))
      .await
  }

  pub async fn delete_food(&self, id: FoodId) -> Result<ApiPayload, ApiError> {
    self
      .send_payload(&format!("/foods/{}", id), RequestOptions::delete())
      .await
  }

  // Search endpoint

  pub async fn search_foods(&self, query: &str) -> ApiPayload {
    let encoded: String = url::form_urlencoded::byte_serialize(query.as_bytes()).collect();
    self.get_payload(&format!("/search?q={}", encoded)).await
  }

  // NLP endpoint

  /// Forward a prompt to the NLP endpoint. Errors propagate; callers that
  /// want a soft failure go through the AI service.
  pub async fn generate_nlp_response(
    &self,
    prompt: &str,
    kind: NlpKind,
    context: &NlpContext,
  ) -> Result<NlpResponse, ApiError> {
    let body = serde_json::to_value(NlpRequest {
      prompt,
      kind,
      context,
    })?;
    let value = self
      .request("/nlp/generate", RequestOptions::post(body))
      .await?;
    let raw: ApiNlpResponse = serde_json::from_value(value)?;

    Ok(NlpResponse {
      response: raw.response.unwrap_or_default(),
      kind: raw
        .kind
        .and_then(|k| serde_json::from_value(Value::String(k)).ok())
        .unwrap_or(kind),
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::transport::testing::{FakeTransport, Reply};
  use serde_json::json;

  fn test_config() -> ApiConfig {
    ApiConfig {
      base_url: "http://api.test/api/".to_string(),
      retry_delay_secs: 0,
      ..Default::default()
    }
  }

  fn service(transport: &FakeTransport) -> ApiService {
    ApiService::with_transport(&test_config(), transport.clone())
  }

  fn regions_body() -> Value {
    json!({
      "success": true,
      "regions": [{"id": 1, "name": "Jawa Timur", "category": "Provinsi", "latitude": -7.5, "longitude": 112.2}]
    })
  }

  #[tokio::test]
  async fn test_identical_gets_hit_network_once() {
    let transport = FakeTransport::always(Reply::ok(regions_body()));
    let api = service(&transport);

    let first = api.get_regions().await;
    let second = api.get_regions().await;

    assert_eq!(transport.calls(), 1);
    assert_eq!(first, second);
    assert_eq!(first.regions[0].name, "Jawa Timur");
  }

  #[tokio::test]
  async fn test_expired_entry_refetches() {
    let transport = FakeTransport::always(Reply::ok(regions_body()));
    let api = service(&transport).with_cache_ttl(chrono::Duration::milliseconds(20));

    api.get_regions().await;
    tokio::time::sleep(Duration::from_millis(40)).await;
    api.get_regions().await;

    assert_eq!(transport.calls(), 2);
  }

  #[tokio::test]
  async fn test_clear_cache_forces_refetch() {
    let transport = FakeTransport::always(Reply::ok(regions_body()));
    let api = service(&transport);

    api.get_regions().await;
    api.clear_cache();
    api.get_regions().await;

    assert_eq!(transport.calls(), 2);
  }

  #[tokio::test]
  async fn test_distinct_endpoints_are_cached_separately() {
    let transport = FakeTransport::always(Reply::ok(json!({"results": []})));
    let api = service(&transport);

    api.search_foods("soto").await;
    api.search_foods("rawon").await;
    api.search_foods("soto").await;

    assert_eq!(transport.calls(), 2);
  }

  #[tokio::test]
  async fn test_get_timeout_retries_then_falls_back() {
    let transport = FakeTransport::always(Reply::Timeout);
    let api = service(&transport);

    let payload = api.get_regions().await;

    assert_eq!(transport.calls(), 3);
    assert!(!payload.success);
    assert!(payload.regions.is_empty());
    assert!(payload.categories.is_empty());
    assert!(payload.foods.is_empty());
    assert!(payload.results.is_empty());
    assert!(payload.error.unwrap().contains("cold starting"));
  }

  #[tokio::test]
  async fn test_raw_get_failure_returns_fallback_shape() {
    let transport = FakeTransport::always(Reply::Timeout);
    let api = service(&transport);

    let value = api.request("/regions", RequestOptions::get()).await.unwrap();

    assert_eq!(value["success"], json!(false));
    assert_eq!(value["results"], json!([]));
    assert!(value["error"].as_str().unwrap().contains("timeout"));
  }

  #[tokio::test]
  async fn test_post_timeout_retries_then_raises() {
    let transport = FakeTransport::always(Reply::Timeout);
    let api = service(&transport);

    let result = api
      .request("/foods", RequestOptions::post(json!({"name": "Soto"})))
      .await;

    assert_eq!(transport.calls(), 3);
    match result {
      Err(ApiError::Timeout { attempts }) => assert_eq!(attempts, 3),
      other => panic!("expected timeout, got {:?}", other),
    }
  }

  #[tokio::test]
  async fn test_recovers_after_one_timeout() {
    let transport = FakeTransport::new([Reply::Timeout, Reply::ok(regions_body())]);
    let api = service(&transport);

    let payload = api.get_regions().await;

    assert_eq!(transport.calls(), 2);
    assert!(payload.success);
    assert_eq!(payload.regions.len(), 1);
  }

  #[tokio::test]
  async fn test_client_side_timeout_counts_as_timeout() {
    let transport = FakeTransport::always(Reply::Slow(
      Duration::from_millis(200),
      regions_body().to_string(),
    ));
    let api = service(&transport).with_timeout(Duration::from_millis(10));

    let result = api.request("/regions", RequestOptions::delete()).await;

    assert_eq!(transport.calls(), 3);
    assert!(result.unwrap_err().is_timeout());
  }

  #[tokio::test]
  async fn test_http_status_is_not_retried() {
    let transport = FakeTransport::always(Reply::Json(500, "{}".to_string()));
    let api = service(&transport);

    let payload = api.get_categories().await;
    assert_eq!(transport.calls(), 1);
    assert!(!payload.success);
    assert_eq!(payload.error.as_deref(), Some("HTTP error! status: 500"));

    let result = api.delete_food(4).await;
    assert_eq!(transport.calls(), 2);
    assert!(matches!(result, Err(ApiError::Status(500))));
  }

  #[tokio::test]
  async fn test_malformed_body_is_not_retried() {
    let transport = FakeTransport::always(Reply::Json(200, "<html>".to_string()));
    let api = service(&transport);

    let payload = api.search_foods("").await;

    assert_eq!(transport.calls(), 1);
    assert!(!payload.success);
    assert!(payload.results.is_empty());
  }

  #[tokio::test]
  async fn test_failed_get_is_not_cached() {
    let transport = FakeTransport::new([Reply::Json(503, "{}".to_string()), Reply::ok(regions_body())]);
    let api = service(&transport);

    assert!(!api.get_regions().await.success);
    assert!(api.get_regions().await.success);
    assert_eq!(transport.calls(), 2);
  }

  #[tokio::test]
  async fn test_mutations_bypass_cache() {
    let transport = FakeTransport::always(Reply::ok(json!({"success": true})));
    let api = service(&transport);

    let input = RegionInput {
      name: "Bali".to_string(),
      category: "Provinsi".to_string(),
      latitude: Some(-8.4),
      longitude: Some(115.2),
      description: "Pulau Dewata".to_string(),
      emoji: "🌴".to_string(),
    };
    api.create_region(&input).await.unwrap();
    api.create_region(&input).await.unwrap();

    assert_eq!(transport.calls(), 2);
    let request = &transport.requests()[0];
    assert_eq!(request.method, HttpMethod::Post);
    assert_eq!(request.url, "http://api.test/api/regions");
    assert_eq!(
      request.headers.get("Content-Type").map(String::as_str),
      Some("application/json")
    );
    let body: Value = serde_json::from_str(request.body.as_deref().unwrap()).unwrap();
    assert_eq!(body["name"], json!("Bali"));
  }

  #[tokio::test]
  async fn test_search_query_is_encoded() {
    let transport = FakeTransport::always(Reply::ok(json!({"results": []})));
    let api = service(&transport);

    api.search_foods("nasi goreng&pedas").await;

    assert_eq!(
      transport.requests()[0].url,
      "http://api.test/api/search?q=nasi+goreng%26pedas"
    );
  }

  #[tokio::test]
  async fn test_custom_headers_are_sent_and_keyed() {
    let transport = FakeTransport::always(Reply::ok(regions_body()));
    let api = service(&transport);

    api.request("/regions", RequestOptions::get()).await.unwrap();
    api
      .request(
        "/regions",
        RequestOptions::get().with_header("Accept-Language", "id"),
      )
      .await
      .unwrap();

    assert_eq!(transport.calls(), 2);
    assert_eq!(
      transport.requests()[1]
        .headers
        .get("Accept-Language")
        .map(String::as_str),
      Some("id")
    );
  }

  #[tokio::test]
  async fn test_nlp_request_shape_and_type_fallback() {
    let transport = FakeTransport::always(Reply::ok(json!({"response": "Rendang dari Padang"})));
    let api = service(&transport);

    let context = NlpContext {
      food_name: Some("Rendang".to_string()),
      ..Default::default()
    };
    let answer = api
      .generate_nlp_response("Bagaimana cara membuat Rendang?", NlpKind::Recipe, &context)
      .await
      .unwrap();

    assert_eq!(answer.response, "Rendang dari Padang");
    assert_eq!(answer.kind, NlpKind::Recipe);

    let body: Value =
      serde_json::from_str(transport.requests()[0].body.as_deref().unwrap()).unwrap();
    assert_eq!(body["type"], json!("recipe"));
    assert_eq!(body["context"]["food_name"], json!("Rendang"));
  }

  #[tokio::test]
  async fn test_disabled_cache_always_fetches() {
    let transport = FakeTransport::always(Reply::ok(regions_body()));
    let config = ApiConfig {
      cache_enabled: false,
      ..test_config()
    };
    let api = ApiService::with_transport(&config, transport.clone());

    api.get_regions().await;
    api.get_regions().await;

    assert_eq!(transport.calls(), 2);
  }
}
