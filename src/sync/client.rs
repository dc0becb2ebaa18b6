//! Static data API client

use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::config::{ApiConfig, DEFAULT_API_VERSION, DEFAULT_BASE_URL, DEFAULT_REGION};
use crate::sync::error::RemoteError;
use crate::sync::remote::RemoteDataSource;
use crate::sync::types::{ChampionDocument, RealmDocument};

/// RemoteDataSource backed by the static data HTTP API
#[derive(Clone)]
pub struct StaticDataClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    region: String,
    api_version: String,
}

impl StaticDataClient {
    /// Creates a client against a custom base URL with default region and API version
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self::with_options(
            base_url,
            api_key,
            DEFAULT_REGION,
            DEFAULT_API_VERSION,
            Duration::from_millis(crate::config::FETCH_TIMEOUT_MS),
        )
    }

    pub fn from_config(config: &ApiConfig) -> Self {
        Self::with_options(
            &config.base_url,
            &config.api_key,
            &config.region,
            &config.api_version,
            Duration::from_millis(config.fetch_timeout_ms),
        )
    }

    fn with_options(
        base_url: &str,
        api_key: &str,
        region: &str,
        api_version: &str,
        timeout: Duration,
    ) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("ddragon-sync")
                .timeout(timeout)
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            region: region.to_string(),
            api_version: api_version.to_string(),
        }
    }

    /// Build the absolute URL for a static data resource, with the API key attached
    fn resource_url(&self, resource: &str, params: &[(&str, &str)]) -> Result<Url, RemoteError> {
        let raw = format!(
            "{}/api/lol/static-data/{}/{}/{}",
            self.base_url, self.region, self.api_version, resource
        );
        let mut url = Url::parse(&raw).map_err(|e| RemoteError::Parse(format!("{raw}: {e}")))?;
        {
            let mut query = url.query_pairs_mut();
            for (name, value) in params {
                query.append_pair(name, value);
            }
            query.append_pair("api_key", &self.api_key);
        }
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, RemoteError> {
        // Keep the api key out of the logs
        let display_url = format!("{}{}", url.origin().ascii_serialization(), url.path());
        debug!("GET {}", display_url);

        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            warn!("static data API returned status {}: {}", status, display_url);
            return Err(RemoteError::Status {
                status: status.as_u16(),
                url: display_url,
            });
        }

        response.json::<T>().await.map_err(|e| {
            warn!("Failed to parse static data response from {}: {}", display_url, e);
            RemoteError::Parse(e.to_string())
        })
    }
}

impl Default for StaticDataClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL, "")
    }
}

#[async_trait::async_trait]
impl RemoteDataSource for StaticDataClient {
    async fn get_realm(&self) -> Result<RealmDocument, RemoteError> {
        let url = self.resource_url("realm", &[])?;
        let realm: RealmDocument = self.get_json(url).await?;
        debug!("Found remote realm version {}", realm.v);
        Ok(realm)
    }

    async fn get_champions(&self, champ_data: &str) -> Result<ChampionDocument, RemoteError> {
        let url = self.resource_url("champion", &[("champData", champ_data)])?;
        let champions: ChampionDocument = self.get_json(url).await?;
        debug!(
            "Fetched {} champions with {} skins",
            champions.data.len(),
            champions.skin_count()
        );
        Ok(champions)
    }
}
