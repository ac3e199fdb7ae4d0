//! Channel gateway for fetching release metadata
//!
//! One batched query per run: every requested package, across every
//! configured channel and platform, fetched concurrently and returned as a
//! single immutable snapshot. A failed fetch is fatal to the whole run; there
//! is no retry, streaming, or partial result.
//!
//! - [`Gateway`]: the fetch seam, mockable in tests
//! - [`conda`]: repodata.json implementation
//! - [`error`]: fetch error types

pub mod conda;
pub mod error;

pub use conda::CondaGateway;
pub use error::RegistryError;

#[cfg(test)]
use mockall::automock;

use crate::policy::Policy;
use crate::release::{RawRelease, ReleaseCatalog};

/// Trait for fetching release records from package channels
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Gateway: Send + Sync {
    /// Fetch all release records for the requested packages.
    ///
    /// # Arguments
    /// * `channels` - channel names or base URLs to query
    /// * `platforms` - platform subdirectories to query per channel
    /// * `packages` - normalized package names to keep
    ///
    /// # Returns
    /// * `Ok(Vec<RawRelease>)` - every matching build, unordered
    /// * `Err(RegistryError)` - if any fetch fails
    async fn query(
        &self,
        channels: &[String],
        platforms: &[String],
        packages: &[String],
    ) -> Result<Vec<RawRelease>, RegistryError>;
}

/// Run the policy's batched query and build the release catalog from it.
pub async fn fetch_release_catalog(
    gateway: &dyn Gateway,
    policy: &Policy,
    packages: &[String],
) -> Result<ReleaseCatalog, RegistryError> {
    let records = gateway
        .query(&policy.channels, &policy.platforms, packages)
        .await?;
    Ok(ReleaseCatalog::from_records(records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use indexmap::IndexMap;

    #[tokio::test]
    async fn fetch_release_catalog_passes_the_policy_channels_through() {
        let mut gateway = MockGateway::new();
        gateway
            .expect_query()
            .withf(|channels, platforms, packages| {
                channels == ["conda-forge"] && platforms == ["noarch"] && packages == ["numpy"]
            })
            .returning(|_, _, _| {
                Ok(vec![RawRelease {
                    name: "numpy".to_string(),
                    version: "1.23.0".parse().unwrap(),
                    build_number: 0,
                    timestamp: Some(Utc.with_ymd_and_hms(2023, 6, 9, 0, 0, 0).unwrap()),
                }])
            });

        let mut policy = Policy::new(IndexMap::new(), 12);
        policy.channels = vec!["conda-forge".to_string()];
        policy.platforms = vec!["noarch".to_string()];

        let catalog = fetch_release_catalog(&gateway, &policy, &["numpy".to_string()])
            .await
            .unwrap();

        assert_eq!(catalog.releases("numpy").len(), 1);
    }

    #[tokio::test]
    async fn fetch_failure_is_propagated_untouched() {
        let mut gateway = MockGateway::new();
        gateway
            .expect_query()
            .returning(|_, _, _| Err(RegistryError::NotFound("repodata.json".to_string())));

        let policy = Policy::new(IndexMap::new(), 12);
        let result = fetch_release_catalog(&gateway, &policy, &[]).await;

        assert!(matches!(result, Err(RegistryError::NotFound(_))));
    }
}
