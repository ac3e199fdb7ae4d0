//! Release records and the per-package release catalog
//!
//! The channel gateway produces one [`RawRelease`] per published build. The
//! catalog builder groups them by package, drops builds the channel never
//! timestamped, collapses duplicate versions down to the earliest-timestamped
//! build, and sorts what survives. Everything downstream (policy selection,
//! reporting) reads the catalog without mutating it.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use crate::version::Version;

/// A single published build of a package version.
///
/// Ordering and equality use `(version, build_number)` only; the timestamp is
/// metadata. Multiple builds of one version may carry different timestamps,
/// which is exactly what deduplication resolves.
#[derive(Debug, Clone)]
pub struct Release {
    pub version: Version,
    pub build_number: u64,
    pub timestamp: Option<DateTime<Utc>>,
}

impl PartialEq for Release {
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version && self.build_number == other.build_number
    }
}

impl Eq for Release {}

impl PartialOrd for Release {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Release {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (&self.version, self.build_number).cmp(&(&other.version, other.build_number))
    }
}

/// A raw record as returned by the channel gateway, before cataloguing.
#[derive(Debug, Clone)]
pub struct RawRelease {
    pub name: String,
    pub version: Version,
    pub build_number: u64,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Normalize a package name the way channel indexes do.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}

/// Deduplicated, sorted releases per package name.
#[derive(Debug, Clone, Default)]
pub struct ReleaseCatalog {
    packages: IndexMap<String, Vec<Release>>,
}

impl ReleaseCatalog {
    /// Build the catalog from raw gateway records.
    ///
    /// Within each package: records without a timestamp are dropped, records
    /// sharing a version keep only the earliest-timestamped build, and the
    /// survivors are sorted ascending by `(version, build_number)`. A package
    /// whose records all lacked timestamps keeps its key with an empty list.
    pub fn from_records(records: impl IntoIterator<Item = RawRelease>) -> Self {
        let mut packages: IndexMap<String, Vec<Release>> = IndexMap::new();
        for record in records {
            packages
                .entry(normalize_name(&record.name))
                .or_default()
                .push(Release {
                    version: record.version,
                    build_number: record.build_number,
                    timestamp: record.timestamp,
                });
        }

        for releases in packages.values_mut() {
            releases.retain(|release| release.timestamp.is_some());
            releases.sort();
            releases.dedup_by(|current, kept| {
                if current.version != kept.version {
                    return false;
                }
                if current.timestamp < kept.timestamp {
                    std::mem::swap(current, kept);
                }
                true
            });
        }

        Self { packages }
    }

    /// The sorted releases for `name`; empty if the package is unknown.
    pub fn releases(&self, name: &str) -> &[Release] {
        self.packages
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.packages.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Release])> {
        self.packages
            .iter()
            .map(|(name, releases)| (name.as_str(), releases.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}
