//! HTTP client for the OpenEI USURDB `utility_rates` API.

use std::time::Duration;

use url::Url;

use crate::{
    query::{GeoRateQuery, Query, UtilityRateQuery},
    types::RatesResponse,
    Error,
};

/// USURDB API version pinned by this client.
const API_VERSION: &str = "8";

/// HTTP client for the OpenEI USURDB API.
///
/// Each call issues a single GET against `/utility_rates` with a 30-second
/// timeout and appends the `api_key`, `version`, and `format` parameters to
/// whatever the query builder produced. Retry and pacing are the caller's
/// concern.
pub struct Client {
    /// Base URL for the API. Defaults to `https://api.openei.org`.
    base_api_url: String,
    api_key: String,
}

impl Client {
    /// Creates a new client pointing at the production OpenEI API.
    pub fn new(api_key: &str) -> Self {
        Self {
            base_api_url: "https://api.openei.org".to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Creates a new client with a custom base URL. Used for testing with wiremock.
    pub fn with_base_url(base_url: &str, api_key: &str) -> Self {
        Self {
            base_api_url: base_url.to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn get_url(&self, query: &impl Query) -> Result<Url, Error> {
        let url = Url::parse(format!("{}/utility_rates", &self.base_api_url).as_str())
            .map_err(|e| {
                tracing::error!("Invalid URL constructed: {}", e);
                Error::RequestFailed
            })?;
        let mut url = query.add_to_url(&url);
        url.query_pairs_mut()
            .append_pair("api_key", &self.api_key)
            .append_pair("version", API_VERSION)
            .append_pair("format", "json");
        Ok(url)
    }

    async fn get<Q>(&self, query: &Q) -> Result<RatesResponse, Error>
    where
        Q: Query,
    {
        let url = self.get_url(query)?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                tracing::error!("Failed to build HTTP client: {}", e);
                Error::RequestFailed
            })?;
        let resp = client
            .get(url)
            .header("accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to get resource: {}", e);
                Error::RequestFailed
            })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| {
            tracing::error!("Failed to read response body: {}", e);
            Error::RequestFailed
        })?;

        if !status.is_success() {
            let snippet = truncate_body(&body);
            tracing::error!("Request failed with status {}: {}", status, snippet);
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body: snippet,
            });
        }

        let parsed = serde_json::from_str::<RatesResponse>(&body).map_err(|e| {
            let snippet = truncate_body(&body);
            tracing::error!("Failed to parse resource: {} | body: {}", e, snippet);
            Error::RequestFailed
        })?;

        Ok(parsed)
    }

    /// Fetches rates around a geographic point.
    pub async fn get_rates(&self, query: &GeoRateQuery) -> Result<RatesResponse, Error> {
        self.get::<GeoRateQuery>(query).await
    }

    /// Fetches rates for one utility by name, newest first.
    pub async fn get_rates_for_utility(
        &self,
        query: &UtilityRateQuery,
    ) -> Result<RatesResponse, Error> {
        self.get::<UtilityRateQuery>(query).await
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 2000;
    if body.len() <= MAX {
        body.to_string()
    } else {
        format!("{}...[truncated]", &body[..MAX])
    }
}
