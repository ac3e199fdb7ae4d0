//! Age-based minimum version policy
//!
//! Given a reference date and a package's release history, the policy selects
//! the oldest version a consumer is still allowed to pin: the newest suitable
//! release that is at least `months` calendar months old. Only minor-boundary
//! releases (`x.y.0`, no pre-release marker) anchor the policy; explicit
//! per-package overrides bypass the window entirely.

use chrono::{Months, NaiveDate};
use indexmap::IndexMap;
use thiserror::Error;
use tracing::debug;

use crate::release::{Release, ReleaseCatalog};
use crate::version::Version;

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("cannot find valid releases for {package}")]
    NoSuitableRelease { package: String },

    #[error("override version {version} for {package} is not in the release catalog")]
    OverrideNotFound { package: String, version: Version },
}

/// The package name → selected minimum release mapping for one run.
pub type PolicyVersions = IndexMap<String, Release>;

/// Immutable policy configuration for one run.
#[derive(Debug, Clone)]
pub struct Policy {
    /// Per-package freshness window in months.
    pub package_months: IndexMap<String, u32>,
    /// Window for packages without an explicit entry.
    pub default_months: u32,

    /// Package sources, passed through to the channel gateway.
    pub channels: Vec<String>,
    /// Platforms to query, passed through to the channel gateway.
    pub platforms: Vec<String>,

    /// Exact versions pinned as a package's minimum, bypassing the window.
    pub overrides: IndexMap<String, Version>,

    /// Packages whose violations are reported but never fail the run.
    pub ignored_violations: Vec<String>,
    /// Packages removed from consideration before anything else happens.
    pub exclude: Vec<String>,
}

impl Policy {
    pub fn new(package_months: IndexMap<String, u32>, default_months: u32) -> Self {
        Self {
            package_months,
            default_months,
            channels: Vec::new(),
            platforms: Vec::new(),
            overrides: IndexMap::new(),
            ignored_violations: Vec::new(),
            exclude: Vec::new(),
        }
    }

    /// Select the minimum allowed release for `package_name` as of `today`.
    ///
    /// `releases` must be sorted ascending by `(version, build_number)`, which
    /// is what [`ReleaseCatalog`](crate::release::ReleaseCatalog) guarantees.
    /// The result depends only on the arguments; the clock is never read here.
    pub fn minimum_version(
        &self,
        today: NaiveDate,
        package_name: &str,
        releases: &[Release],
    ) -> Result<Release, PolicyError> {
        if let Some(override_version) = self.overrides.get(package_name) {
            return find_release(releases, override_version)
                .cloned()
                .ok_or_else(|| PolicyError::OverrideNotFound {
                    package: package_name.to_string(),
                    version: override_version.clone(),
                });
        }

        let suitable: Vec<&Release> = releases
            .iter()
            .filter(|release| is_suitable_release(release))
            .collect();
        if suitable.is_empty() {
            return Err(PolicyError::NoSuitableRelease {
                package: package_name.to_string(),
            });
        }

        let months = self
            .package_months
            .get(package_name)
            .copied()
            .unwrap_or(self.default_months);
        let cutoff = today
            .checked_sub_months(Months::new(months))
            .unwrap_or(NaiveDate::MIN);

        // Left insertion point of the cutoff in timestamp-date order; the
        // release just before it is the newest one old enough to require.
        // When nothing is old enough, fall back to the earliest suitable
        // release rather than selecting nothing.
        let index = suitable.partition_point(|release| {
            release
                .timestamp
                .is_some_and(|timestamp| timestamp.date_naive() < cutoff)
        });
        let selected = suitable[index.saturating_sub(1)];

        debug!(
            "minimum version for {}: {} (window {} months, cutoff {})",
            package_name, selected.version, months, cutoff
        );
        Ok(selected.clone())
    }
}

/// Exact version lookup on a version-sorted release list.
fn find_release<'a>(releases: &'a [Release], version: &Version) -> Option<&'a Release> {
    let index = releases.partition_point(|release| release.version < *version);
    releases
        .get(index)
        .filter(|release| release.version == *version)
}

/// Only timestamped minor-boundary releases (`x.y.0`, not a pre-release)
/// qualify as policy anchors.
fn is_suitable_release(release: &Release) -> bool {
    if release.timestamp.is_none() || release.version.is_preview() {
        return false;
    }
    release.version.extend_to_length(3).segments()[2] == 0
}

/// Compute the minimum release for every requested package.
///
/// A package the catalog has no (timestamped) releases for is a hard error:
/// the policy cannot establish a minimum for it.
pub fn find_policy_versions(
    policy: &Policy,
    today: NaiveDate,
    packages: &[String],
    catalog: &ReleaseCatalog,
) -> Result<PolicyVersions, PolicyError> {
    packages
        .iter()
        .map(|name| {
            let release = policy.minimum_version(today, name, catalog.releases(name))?;
            Ok((name.clone(), release))
        })
        .collect()
}
