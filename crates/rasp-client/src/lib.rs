// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Client library for the Yandex.Rasp transport schedule API.
//!
//! The library is split into layers that can be used on their own:
//!
//! - **Request layer**: [`SearchRequest`] and its parameter enums, which know
//!   how to render themselves as the API's query string
//! - **Response layer**: [`ScheduleResponse`] mirrors the documented JSON shape
//!   field for field
//! - **Suggest layer**: extraction of a city code from the loosely typed
//!   suggest endpoint
//! - **Transport layer**: [`RaspClient`], an async HTTP client that prefixes
//!   every request with a CORS proxy URL
//!
//! # Quick Start
//!
//! ```no_run
//! use rasp_client::{ClientConfig, RaspClient, SearchRequest};
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = RaspClient::new(ClientConfig {
//!         api_key: Some("my-key".to_string()),
//!         ..Default::default()
//!     });
//!
//!     let moscow = client.suggest_city("Москва").await.unwrap();
//!     let request = SearchRequest {
//!         to: moscow.code,
//!         ..Default::default()
//!     };
//!     for segment in client.search(&request).await.unwrap().segments {
//!         println!("{} -> {}", segment.departure, segment.arrival);
//!     }
//! }
//! ```
//!
//! # Building a Query Without the Network
//!
//! ```
//! use rasp_client::{SearchRequest, TransportType};
//!
//! let request = SearchRequest {
//!     transport_types: vec![TransportType::Train, TransportType::Bus],
//!     ..Default::default()
//! };
//! let query = request.query_string("key");
//! assert!(query.contains("transport_types=train%2Cbus"));
//! ```

mod error;
pub mod request;
pub mod response;
pub mod suggest;

pub use error::ClientError;
pub use request::{
    Format, Lang, ResultTimezone, SearchRequest, ShowSystems, System, TransportType,
};
pub use response::{
    Carrier, IntervalSegment, Pagination, ScheduleResponse, SearchInfo, Segment, Station, Thread,
};
pub use suggest::CitySuggestion;

use log::debug;

/// Default base URL of the point-to-point search endpoint.
pub const DEFAULT_API_URL: &str = "https://api.rasp.yandex.net/v3.0/search/?";

/// Default base URL of the city suggest endpoint. The city name is appended.
pub const DEFAULT_SUGGESTS_URL: &str =
    "https://suggests.rasp.yandex.net/all_suggests?format=old&part=";

/// Default CORS proxy prefix placed in front of every request URL.
pub const DEFAULT_PROXY_URL: &str = "https://corsproxy.io/?";

/// Endpoint and credential configuration for [`RaspClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Search endpoint, ending in `?` so the query string can be appended.
    pub api_url: String,
    /// Suggest endpoint, ending in the parameter the city name is appended to.
    pub suggests_url: String,
    /// Proxy prefix. An empty string sends requests directly.
    pub proxy_url: String,
    /// API key. A missing key is sent as an empty `apikey` parameter and the
    /// server rejects the call.
    pub api_key: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            suggests_url: DEFAULT_SUGGESTS_URL.to_string(),
            proxy_url: DEFAULT_PROXY_URL.to_string(),
            api_key: None,
        }
    }
}

/// Async client for the schedule search and city suggest endpoints.
#[derive(Debug, Clone)]
pub struct RaspClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl RaspClient {
    /// Create a client with a fresh connection pool.
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Get the client configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Full URL (proxy prefix included) for a search request.
    #[must_use]
    pub fn search_url(&self, request: &SearchRequest) -> String {
        let api_key = self.config.api_key.as_deref().unwrap_or_default();
        format!(
            "{}{}{}",
            self.config.proxy_url,
            self.config.api_url,
            request.query_string(api_key)
        )
    }

    /// Full URL (proxy prefix included) for a city suggest lookup.
    #[must_use]
    pub fn suggest_url(&self, city_name: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(city_name.as_bytes()).collect();
        format!(
            "{}{}{}",
            self.config.proxy_url, self.config.suggests_url, encoded
        )
    }

    /// Run a point-to-point schedule search.
    pub async fn search(&self, request: &SearchRequest) -> Result<ScheduleResponse, ClientError> {
        let url = self.search_url(request);
        debug!("Searching schedule: {} -> {} on {}", request.from, request.to, request.date);

        let body = self.get_text(&url).await?;
        let response: ScheduleResponse = serde_json::from_str(&body)?;

        debug!(
            "Schedule search returned {} segments ({} total)",
            response.segments.len(),
            response.pagination.total
        );
        Ok(response)
    }

    /// Resolve a free-text city name into its Rasp code and display title.
    pub async fn suggest_city(&self, city_name: &str) -> Result<CitySuggestion, ClientError> {
        let url = self.suggest_url(city_name);
        debug!("Resolving city code for '{city_name}'");

        let body = self.get_text(&url).await?;
        let value: serde_json::Value = serde_json::from_str(&body)?;
        CitySuggestion::from_response(&value)
    }

    async fn get_text(&self, url: &str) -> Result<String, ClientError> {
        let response = self.http.get(url).send().await?;

        if !response.status().is_success() {
            return Err(ClientError::Status(response.status()));
        }

        Ok(response.text().await?)
    }
}
