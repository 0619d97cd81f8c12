//! JSON request executor for the subscriptions REST API.
//!
//! Every call goes through [`ApiClient::execute`]: one request, no retries,
//! no timeouts, no auth headers. Any answer that parses as JSON is an
//! [`ApiResponse`] regardless of its status code.

use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::CoreError;

/// A JSON answer from the API, successful or not.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, CoreError> {
        let http = Client::builder()
            .build()
            .map_err(|e| CoreError::Network(e.to_string()))?;
        Ok(Self::with_client(http, base_url))
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an API path such as `/users/3/subscriptions`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Issue one request and decode the body as JSON.
    ///
    /// `query` pairs are form-url-encoded as given; pass only the ones that
    /// should appear. `Content-Type: application/json` is set only when a
    /// body is present.
    #[instrument(skip(self, query, body), fields(%method, path = %path))]
    pub async fn execute<B>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<ApiResponse, CoreError>
    where
        B: Serialize + ?Sized,
    {
        let mut req = self.http.request(method, self.url(path));
        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        debug!("sending request");
        let resp = req.send().await.map_err(|e| {
            warn!(error = %e, "request failed");
            CoreError::Network(e.to_string())
        })?;

        let status = resp.status();
        let body = resp.json::<Value>().await.map_err(|e| {
            warn!(status = status.as_u16(), error = %e, "response body is not JSON");
            if e.is_decode() {
                CoreError::Parse(e.to_string())
            } else {
                CoreError::Network(e.to_string())
            }
        })?;
        debug!(status = status.as_u16(), "response received");
        Ok(ApiResponse { status, body })
    }

    pub async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<ApiResponse, CoreError> {
        self.execute::<Value>(Method::GET, path, query, None).await
    }

    pub async fn send_json<B>(&self, method: Method, path: &str, body: &B) -> Result<ApiResponse, CoreError>
    where
        B: Serialize + ?Sized,
    {
        self.execute(method, path, &[], Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<ApiResponse, CoreError> {
        self.execute::<Value>(Method::DELETE, path, &[], None).await
    }
}
