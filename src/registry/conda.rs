//! Conda channel gateway
//!
//! Fetches `{channel}/{platform}/repodata.json` for every configured channel
//! and platform and extracts `(name, version, build_number, timestamp)` from
//! the `packages` and `packages.conda` tables. Timestamps are epoch
//! milliseconds; builds the channel never timestamped come back with `None`
//! and are dropped later by the catalog builder.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use indexmap::IndexMap;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::registry::Gateway;
use crate::registry::error::RegistryError;
use crate::release::{RawRelease, normalize_name};
use crate::version::Version;

const DEFAULT_CHANNEL_HOST: &str = "https://conda.anaconda.org";

/// Gateway over conda-style channel indexes
pub struct CondaGateway {
    client: Client,
    channel_host: String,
}

impl Default for CondaGateway {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_HOST.to_string())
    }
}

impl CondaGateway {
    pub fn new(channel_host: String) -> Self {
        Self {
            client: Client::new(),
            channel_host,
        }
    }

    /// Channels are either bare names (resolved against the channel host) or
    /// full base URLs.
    fn channel_base_url(&self, channel: &str) -> String {
        if channel.contains("://") {
            channel.trim_end_matches('/').to_string()
        } else {
            format!("{}/{}", self.channel_host, channel)
        }
    }

    async fn fetch_repodata(
        &self,
        channel: &str,
        platform: &str,
    ) -> Result<Vec<RawRelease>, RegistryError> {
        let url = format!(
            "{}/{}/repodata.json",
            self.channel_base_url(channel),
            platform
        );
        debug!("Fetching repodata: {}", url);

        let response = self.client.get(&url).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(RegistryError::NotFound(url));
        }
        if !response.status().is_success() {
            return Err(RegistryError::InvalidResponse(format!(
                "channel index {} returned status {}",
                url,
                response.status()
            )));
        }

        let repodata: Repodata = response
            .json()
            .await
            .map_err(|e| RegistryError::InvalidResponse(e.to_string()))?;

        debug!(
            "Found {} records in {}/{}",
            repodata.packages.len() + repodata.conda_packages.len(),
            channel,
            platform
        );
        Ok(repodata.into_releases())
    }
}

/// The subset of repodata.json the policy needs
#[derive(Debug, Deserialize)]
struct Repodata {
    #[serde(default)]
    packages: IndexMap<String, RepodataRecord>,
    #[serde(default, rename = "packages.conda")]
    conda_packages: IndexMap<String, RepodataRecord>,
}

#[derive(Debug, Deserialize)]
struct RepodataRecord {
    name: String,
    version: String,
    #[serde(default)]
    build_number: u64,
    /// Epoch milliseconds; absent for very old builds
    #[serde(default)]
    timestamp: Option<i64>,
}

impl Repodata {
    fn into_releases(self) -> Vec<RawRelease> {
        self.packages
            .into_values()
            .chain(self.conda_packages.into_values())
            .filter_map(|record| {
                let version = match record.version.parse::<Version>() {
                    Ok(version) => version,
                    Err(error) => {
                        // A version that cannot be ordered cannot be policed.
                        debug!("Skipping {} {}: {}", record.name, record.version, error);
                        return None;
                    }
                };
                Some(RawRelease {
                    name: normalize_name(&record.name),
                    version,
                    build_number: record.build_number,
                    timestamp: record
                        .timestamp
                        .and_then(|millis| DateTime::<Utc>::from_timestamp_millis(millis)),
                })
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl Gateway for CondaGateway {
    async fn query(
        &self,
        channels: &[String],
        platforms: &[String],
        packages: &[String],
    ) -> Result<Vec<RawRelease>, RegistryError> {
        let requested: HashSet<String> = packages.iter().map(|name| normalize_name(name)).collect();

        let fetches = channels.iter().flat_map(|channel| {
            platforms
                .iter()
                .map(move |platform| self.fetch_repodata(channel, platform))
        });
        let results = try_join_all(fetches).await?;

        Ok(results
            .into_iter()
            .flatten()
            .filter(|record| requested.contains(&record.name))
            .collect())
    }
}
