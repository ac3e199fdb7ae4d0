//! Report assembly
//!
//! Joins the policy-selected minimums, the declared specs, and the release
//! catalog into presentation-ready rows. No formatting happens here; the
//! output layer owns how a row is shown.

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

use crate::parser::types::{Spec, Warnings};
use crate::policy::PolicyVersions;
use crate::release::{Release, ReleaseCatalog};
use crate::version::Version;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("no policy version was computed for {package}")]
    UnknownPackage { package: String },
}

/// How a declared version relates to the policy minimum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionStatus {
    /// Declared below the policy minimum (stale but lenient)
    Below,
    /// Exactly the policy minimum
    Equal,
    /// Declared above the minimum (ahead of the floor)
    Above,
    /// Not pinned at all; always flagged
    Unpinned,
}

impl VersionStatus {
    pub fn symbol(&self) -> char {
        match self {
            VersionStatus::Below => '<',
            VersionStatus::Equal => '=',
            VersionStatus::Above => '>',
            VersionStatus::Unpinned => '!',
        }
    }
}

/// One report line per declared spec.
#[derive(Debug, Clone)]
pub struct ReportRow {
    pub package: String,
    pub required_version: Option<Version>,
    pub required_date: Option<NaiveDate>,
    /// The policy minimum at minor granularity (`1.23`, never `1.23.0`).
    pub policy_version: Version,
    pub policy_date: Option<NaiveDate>,
    pub status: VersionStatus,
    /// Whether this package's violations are ignored; the renderer uses this
    /// to soften an `Above` row.
    pub ignored: bool,
}

/// Assemble the rows for one environment.
///
/// Returns the rows plus the environment's warning map, extended with an
/// "unpinned dependency" warning for every spec without a version. The input
/// warnings are not mutated.
pub fn assemble(
    specs: &[Spec],
    policy_versions: &PolicyVersions,
    catalog: &ReleaseCatalog,
    warnings: &Warnings,
    ignored_violations: &[String],
) -> Result<(Vec<ReportRow>, Warnings), ReportError> {
    let mut warnings = warnings.clone();
    let mut rows = Vec::with_capacity(specs.len());

    for spec in specs {
        let policy_release =
            policy_versions
                .get(&spec.name)
                .ok_or_else(|| ReportError::UnknownPackage {
                    package: spec.name.clone(),
                })?;

        let required_date = match &spec.version {
            Some(version) => lookup_spec_release(version, catalog.releases(&spec.name))
                .timestamp
                .map(|timestamp| timestamp.date_naive()),
            None => {
                warnings.entry(spec.name.clone()).or_default().push(
                    "Unpinned dependency. Consider pinning or ignoring this dependency."
                        .to_string(),
                );
                None
            }
        };

        let policy_version = policy_release.version.with_segments(2);
        rows.push(ReportRow {
            package: spec.name.clone(),
            required_version: spec.version.clone(),
            required_date,
            status: version_status(spec.version.as_ref(), &policy_version),
            policy_version,
            policy_date: policy_release
                .timestamp
                .map(|timestamp| timestamp.date_naive()),
            ignored: ignored_violations.contains(&spec.name),
        });
    }

    Ok((rows, warnings))
}

fn version_status(required: Option<&Version>, policy: &Version) -> VersionStatus {
    match required {
        None => VersionStatus::Unpinned,
        Some(version) if version < policy => VersionStatus::Below,
        Some(version) if version > policy => VersionStatus::Above,
        Some(_) => VersionStatus::Equal,
    }
}

/// The first catalog release compatible (same major.minor) with the declared
/// version, or a sentinel unknown release when nothing matches.
fn lookup_spec_release(version: &Version, releases: &[Release]) -> Release {
    let target = version.extend_to_length(3);
    releases
        .iter()
        .find(|release| release.version.compatible_with(&target))
        .cloned()
        .unwrap_or_else(unknown_release)
}

fn unknown_release() -> Release {
    Release {
        version: Version::default(),
        build_number: 0,
        timestamp: Some(DateTime::<Utc>::UNIX_EPOCH),
    }
}
