//! Snipe-IT REST client.
//!
//! Uses raw HTTP requests against `/api/v1`. Snipe-IT sometimes reports
//! failures with a 200 status and a `{"status": "error"}` body, so every
//! response is inspected before it is decoded into typed rows.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use stocktake_model::{Asset, Location, LocationId, Page};
use tracing::{debug, instrument};

use crate::config::BackendConfig;
use crate::error::{BackendError, Result};
use crate::InventoryBackend;

/// Page size requested from list endpoints.
const LIST_LIMIT: u32 = 500;

pub struct SnipeItBackend {
    base_url: String,
    http_client: reqwest::Client,
}

impl SnipeItBackend {
    /// Build a client from configuration. Fails on a malformed base URL or token.
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let base_url = config.api_url.trim_end_matches('/').to_string();
        Url::parse(&base_url)
            .map_err(|e| BackendError::Config(format!("invalid api_url '{}': {}", base_url, e)))?;

        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", config.api_token.trim()))
            .map_err(|_| BackendError::Config("api_token contains invalid characters".into()))?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout())
            .build()
            .map_err(|e| BackendError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url,
            http_client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&format!("{}/api/v1", self.base_url))
            .map_err(|e| BackendError::Config(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| BackendError::Config(format!("api_url cannot be a base: {}", self.base_url)))?
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, method: Method, url: Url, body: Option<Value>) -> Result<Value> {
        debug!(%method, %url, "inventory request");
        let mut request = self.http_client.request(method, url);
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or("").to_string();
            if status == StatusCode::NOT_FOUND {
                return Err(BackendError::NotFound(reason));
            }
            return Err(BackendError::remote(status.as_u16(), reason));
        }

        let payload: Value = response.json().await?;
        if let Some(message) = error_message(&payload) {
            return Err(BackendError::remote(status.as_u16(), message));
        }
        Ok(payload)
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let payload = self.send(Method::GET, url, None).await?;
        Ok(serde_json::from_value(payload)?)
    }
}

/// Extract the message of a `{"status": "error", "messages": ...}` body.
fn error_message(payload: &Value) -> Option<String> {
    if payload.get("status").and_then(Value::as_str) != Some("error") {
        return None;
    }
    let message = match payload.get("messages") {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Null) | None => "request rejected".to_string(),
        Some(other) => other.to_string(),
    };
    Some(message)
}

#[async_trait]
impl InventoryBackend for SnipeItBackend {
    fn name(&self) -> &'static str {
        "snipe-it"
    }

    #[instrument(skip(self))]
    async fn list_locations(&self) -> Result<Vec<Location>> {
        let mut url = self.endpoint(&["locations"])?;
        url.query_pairs_mut()
            .append_pair("limit", &LIST_LIMIT.to_string());
        let page: Page<Location> = self.get(url).await?;
        Ok(page.into_rows())
    }

    #[instrument(skip(self))]
    async fn get_location(&self, id: LocationId) -> Result<Location> {
        let url = self.endpoint(&["locations", id.to_string().as_str()])?;
        self.get(url).await
    }

    #[instrument(skip(self))]
    async fn list_assets_at_location(&self, location_id: LocationId) -> Result<Vec<Asset>> {
        let mut url = self.endpoint(&["hardware"])?;
        url.query_pairs_mut()
            .append_pair("location_id", &location_id.to_string())
            .append_pair("limit", &LIST_LIMIT.to_string());
        let page: Page<Asset> = self.get(url).await?;
        Ok(page.into_rows())
    }

    #[instrument(skip(self))]
    async fn find_asset_by_tag(&self, tag: &str) -> Result<Asset> {
        let url = self.endpoint(&["hardware", "bytag", tag])?;
        match self.get::<Asset>(url).await {
            // Snipe-IT answers unknown tags with 200 + status error.
            Err(BackendError::Remote { status: 200, message }) => Err(BackendError::NotFound(format!(
                "asset tag '{}': {}",
                tag, message
            ))),
            Err(BackendError::NotFound(_)) => {
                Err(BackendError::NotFound(format!("asset tag '{}'", tag)))
            }
            other => other,
        }
    }

    #[instrument(skip(self))]
    async fn set_asset_location(&self, asset_id: u64, location_id: LocationId) -> Result<()> {
        let url = self.endpoint(&["hardware", asset_id.to_string().as_str()])?;
        let body = json!({ "rtd_location_id": location_id });
        match self.send(Method::PATCH, url, Some(body)).await {
            Ok(_) => Ok(()),
            Err(BackendError::NotFound(reason)) => Err(BackendError::remote(404, reason)),
            Err(err) => Err(err),
        }
    }
}
