//! Violation comparison for declared environments
//!
//! An environment fails when any of its declared specs violates the policy:
//! the spec is unpinned, or pinned above the policy-selected minimum. Ignored
//! packages never fail an environment; they still show up in the report.

use indexmap::IndexMap;
use thiserror::Error;

use crate::parser::types::Spec;
use crate::policy::PolicyVersions;

#[derive(Debug, Error)]
pub enum CheckError {
    #[error("no policy version was computed for {package}")]
    UnknownPackage { package: String },
}

/// Decide pass/fail per environment.
///
/// Pure function: `true` means the environment has at least one violation.
pub fn compare_environments(
    environments: &IndexMap<String, Vec<Spec>>,
    policy_versions: &PolicyVersions,
    ignored_violations: &[String],
) -> Result<IndexMap<String, bool>, CheckError> {
    let mut status = IndexMap::with_capacity(environments.len());
    for (environment, specs) in environments {
        let mut failed = false;
        for spec in specs {
            if ignored_violations.contains(&spec.name) {
                continue;
            }
            let policy_release =
                policy_versions
                    .get(&spec.name)
                    .ok_or_else(|| CheckError::UnknownPackage {
                        package: spec.name.clone(),
                    })?;
            let violates = match &spec.version {
                None => true,
                Some(version) => *version > policy_release.version,
            };
            if violates {
                failed = true;
                break;
            }
        }
        status.insert(environment.clone(), failed);
    }
    Ok(status)
}
