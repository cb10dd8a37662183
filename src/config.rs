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

//! Application configuration management.
//!
//! Configuration is stored as TOML through `confy`. Credentials may also come
//! from environment variables, which take precedence over the file. Missing
//! credentials are not a startup error: the affected feature keeps working
//! locally and its external calls fail.

use log::warn;
use rasp_client::{ClientConfig, DEFAULT_API_URL, DEFAULT_PROXY_URL, DEFAULT_SUGGESTS_URL};
use serde::{Deserialize, Serialize};

const APP_NAME: &str = "geotransit-desktop";
const CONFIG_NAME: &str = "config";

/// Environment variable overriding [`AppConfig::mapbox_access_token`]
pub const MAPBOX_TOKEN_ENV: &str = "MAPBOX_ACCESS_TOKEN";

/// Environment variable overriding [`AppConfig::rasp_api_key`]
pub const RASP_API_KEY_ENV: &str = "YANDEX_RASP_API_KEY";

/// Application configuration stored in TOML format
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    /// Configuration schema version for migrations
    #[serde(default = "default_config_version")]
    pub config_version: u32,

    /// Mapbox access token for base map tiles (env var takes precedence)
    #[serde(default)]
    pub mapbox_access_token: Option<String>,

    /// Mapbox style id as `owner/style`
    #[serde(default = "default_map_style")]
    pub map_style: String,

    /// Initial map center latitude
    #[serde(default = "default_center_lat")]
    pub map_center_lat: f64,

    /// Initial map center longitude
    #[serde(default = "default_center_lon")]
    pub map_center_lon: f64,

    /// Initial map zoom level
    #[serde(default = "default_zoom")]
    pub default_zoom: f32,

    /// Initial extrusion height in meters
    #[serde(default)]
    pub default_height: f64,

    /// Yandex.Rasp API key (env var takes precedence)
    #[serde(default)]
    pub rasp_api_key: Option<String>,

    /// Yandex.Rasp search endpoint
    #[serde(default = "default_rasp_api_url")]
    pub rasp_api_url: String,

    /// Yandex.Rasp city suggest endpoint
    #[serde(default = "default_rasp_suggests_url")]
    pub rasp_suggests_url: String,

    /// CORS proxy prefix placed before every Rasp request
    #[serde(default = "default_proxy_url")]
    pub proxy_url: String,
}

// Default value functions for serde
fn default_config_version() -> u32 {
    1
}

fn default_map_style() -> String {
    "mapbox/streets-v11".to_string()
}

fn default_center_lat() -> f64 {
    55.75
}

fn default_center_lon() -> f64 {
    37.62
}

fn default_zoom() -> f32 {
    8.0
}

fn default_rasp_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_rasp_suggests_url() -> String {
    DEFAULT_SUGGESTS_URL.to_string()
}

fn default_proxy_url() -> String {
    DEFAULT_PROXY_URL.to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_version: default_config_version(),
            mapbox_access_token: None,
            map_style: default_map_style(),
            map_center_lat: default_center_lat(),
            map_center_lon: default_center_lon(),
            default_zoom: default_zoom(),
            default_height: 0.0,
            rasp_api_key: None,
            rasp_api_url: default_rasp_api_url(),
            rasp_suggests_url: default_rasp_suggests_url(),
            proxy_url: default_proxy_url(),
        }
    }
}

impl AppConfig {
    /// Load configuration from disk, falling back to defaults on failure
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(config) => config,
            Err(e) => {
                warn!("Failed to load configuration, using defaults: {e}");
                Self::default()
            }
        }
    }

    /// Load configuration from disk
    pub fn load() -> Result<Self, confy::ConfyError> {
        confy::load(APP_NAME, CONFIG_NAME)
    }

    /// Get the config file path for display to user
    pub fn get_config_path() -> Result<std::path::PathBuf, confy::ConfyError> {
        confy::get_configuration_file_path(APP_NAME, CONFIG_NAME)
    }

    /// Mapbox token from the environment or the config file
    pub fn resolve_mapbox_token(&self) -> Option<String> {
        resolve_secret(std::env::var(MAPBOX_TOKEN_ENV).ok(), self.mapbox_access_token.as_deref())
    }

    /// Rasp API key from the environment or the config file
    pub fn resolve_rasp_api_key(&self) -> Option<String> {
        resolve_secret(std::env::var(RASP_API_KEY_ENV).ok(), self.rasp_api_key.as_deref())
    }

    /// Client configuration for the schedule API
    pub fn rasp_client_config(&self) -> ClientConfig {
        ClientConfig {
            api_url: self.rasp_api_url.clone(),
            suggests_url: self.rasp_suggests_url.clone(),
            proxy_url: self.proxy_url.clone(),
            api_key: self.resolve_rasp_api_key(),
        }
    }

    /// Log a warning for every credential that is missing
    pub fn warn_missing_credentials(&self) {
        if self.resolve_mapbox_token().is_none() {
            warn!("No Mapbox access token ({MAPBOX_TOKEN_ENV}); base map tiles will not load");
        }
        if self.resolve_rasp_api_key().is_none() {
            warn!("No Yandex.Rasp API key ({RASP_API_KEY_ENV}); schedule searches will fail");
        }
    }
}

/// Prefer a non-empty environment value, then a non-empty configured value
fn resolve_secret(env_value: Option<String>, config_value: Option<&str>) -> Option<String> {
    if let Some(value) = env_value.filter(|v| !v.is_empty()) {
        return Some(value);
    }

    config_value.map(str::to_string).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_value_takes_precedence() {
        let resolved = resolve_secret(Some("from-env".to_string()), Some("from-file"));
        assert_eq!(resolved.as_deref(), Some("from-env"));
    }

    #[test]
    fn test_empty_values_are_missing() {
        assert_eq!(resolve_secret(Some(String::new()), Some("")), None);
        assert_eq!(
            resolve_secret(Some(String::new()), Some("from-file")).as_deref(),
            Some("from-file")
        );
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: AppConfig = from_json(r#"{"map_style": "mapbox/dark-v10"}"#);
        assert_eq!(config.map_style, "mapbox/dark-v10");
        assert_eq!(config.map_center_lat, 55.75);
        assert_eq!(config.default_zoom, 8.0);
        assert_eq!(config.proxy_url, "https://corsproxy.io/?");
    }

    #[test]
    fn test_client_config_carries_endpoints() {
        let config = AppConfig {
            proxy_url: String::new(),
            ..Default::default()
        };
        let client = config.rasp_client_config();
        assert_eq!(client.proxy_url, "");
        assert_eq!(client.api_url, DEFAULT_API_URL);
    }

    fn from_json(source: &str) -> AppConfig {
        serde_json::from_str(source).unwrap()
    }
}
