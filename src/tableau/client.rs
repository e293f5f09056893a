//! Tableau API client
//!
//! Provides a typed HTTP client for the site-scoped Tableau REST API.
//! Each call issues exactly one request; retry policy belongs to callers.

use crate::auth::BoxedAuthProvider;
use crate::config::TableauConfig;
use crate::error::{TableauError, TableauResult};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, Response};
use serde::{Serialize, de::DeserializeOwned};
use std::time::Duration;
use tracing::{debug, instrument};

/// Build the shared HTTP client used for API calls and sign-in
pub(crate) fn build_http_client(config: &TableauConfig) -> reqwest::Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .pool_idle_timeout(Duration::from_secs(90))
        .danger_accept_invalid_certs(!config.verify_ssl)
        .default_headers(headers)
        .user_agent(format!("tableau-grants/{}", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Tableau API client bound to one site
pub struct TableauClient {
    http: Client,
    base_url: String,
    auth: BoxedAuthProvider,
}

impl TableauClient {
    /// Create a new client from configuration and an authenticated session
    pub fn new(config: &TableauConfig, auth: BoxedAuthProvider) -> TableauResult<Self> {
        let http = build_http_client(config).map_err(TableauError::Request)?;

        Ok(Self {
            http,
            base_url: config.site_url(auth.site_id()),
            auth,
        })
    }

    /// Site-scoped base URL, e.g. `https://host/api/3.19/sites/{site-id}`
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a URL for an API endpoint
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Add authentication to a request
    async fn authenticate(&self, request: RequestBuilder) -> TableauResult<RequestBuilder> {
        let header = self.auth.get_auth_header().await?;
        Ok(request.header(header.header_name(), header.header_value()))
    }

    /// Send a request once and map non-success statuses
    async fn execute(&self, request: RequestBuilder) -> TableauResult<Response> {
        let response = request.send().await?;
        let status = response.status();
        debug!(status = status.as_u16(), "Tableau responded");

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(TableauError::from_response(status.as_u16(), &body))
    }

    /// Make a GET request
    #[instrument(skip(self), fields(endpoint = %endpoint))]
    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> TableauResult<T> {
        let request = self.authenticate(self.http.get(self.url(endpoint))).await?;

        let response = self.execute(request).await?;
        let data = response.json().await.map_err(|e| {
            TableauError::InvalidResponse(format!("Failed to parse response: {}", e))
        })?;

        Ok(data)
    }

    /// Make a PUT request, discarding the response body
    #[instrument(skip(self, body), fields(endpoint = %endpoint))]
    pub async fn put_no_content<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> TableauResult<()> {
        let request = self
            .authenticate(self.http.put(self.url(endpoint)).json(body))
            .await?;

        self.execute(request).await?;
        Ok(())
    }

    /// Make a DELETE request
    #[instrument(skip(self), fields(endpoint = %endpoint))]
    pub async fn delete(&self, endpoint: &str) -> TableauResult<()> {
        let request = self.authenticate(self.http.delete(self.url(endpoint))).await?;

        self.execute(request).await?;
        Ok(())
    }

    /// URL-encode a single path segment (LUID, capability name, ...)
    pub fn encode_segment(segment: &str) -> String {
        urlencoding::encode(segment).into_owned()
    }
}
