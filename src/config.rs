//! Policy document loading and validation
//!
//! The policy is a YAML document validated against an embedded JSON Schema
//! before anything else happens: validation failure is fatal and reported
//! with the offending instance path, and no release fetch is attempted. The
//! validated document is then deserialized into [`Policy`].

use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;

use crate::policy::Policy;
use crate::version::Version;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read policy document {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid policy document: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid policy definition: {path}: {message}")]
    Schema { path: String, message: String },

    #[error("invalid override version for {package}: {source}")]
    InvalidOverride {
        package: String,
        #[source]
        source: crate::version::VersionError,
    },
}

/// The JSON Schema every policy document must satisfy.
///
/// Note: override values are declared with `"format": "date"`, but format
/// assertions are not enabled, so exact-version values validate as well.
/// They are parsed as versions after validation.
fn policy_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "channels": {"type": "array", "items": {"type": "string"}},
            "platforms": {"type": "array", "items": {"type": "string"}},
            "policy": {
                "type": "object",
                "properties": {
                    "packages": {
                        "type": "object",
                        "patternProperties": {
                            "^[a-z][a-z0-9_-]*$": {"type": "integer", "minimum": 1}
                        },
                        "additionalProperties": false
                    },
                    "default": {"type": "integer", "minimum": 1},
                    "overrides": {
                        "type": "object",
                        "patternProperties": {
                            "^[a-z][a-z0-9_-]*": {"type": "string", "format": "date"}
                        },
                        "additionalProperties": false
                    },
                    "exclude": {"type": "array", "items": {"type": "string"}},
                    "ignored_violations": {
                        "type": "array",
                        "items": {"type": "string", "pattern": "^[a-z][a-z0-9_-]*$"}
                    }
                },
                "required": [
                    "packages",
                    "default",
                    "overrides",
                    "exclude",
                    "ignored_violations"
                ]
            }
        },
        "required": ["channels", "platforms", "policy"]
    })
}

#[derive(Debug, Deserialize)]
struct PolicyDocument {
    channels: Vec<String>,
    platforms: Vec<String>,
    policy: PackagePolicy,
}

#[derive(Debug, Deserialize)]
struct PackagePolicy {
    packages: IndexMap<String, u32>,
    #[serde(rename = "default")]
    default_months: u32,
    overrides: IndexMap<String, String>,
    exclude: Vec<String>,
    ignored_violations: Vec<String>,
}

/// Load and validate the policy document at `path`.
pub fn load_policy(path: &Path) -> Result<Policy, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_policy(&text)
}

/// Validate a policy document against the schema and build a [`Policy`].
pub fn parse_policy(text: &str) -> Result<Policy, ConfigError> {
    let document: serde_yaml::Value = serde_yaml::from_str(text)?;
    let instance = serde_json::to_value(&document).map_err(|error| ConfigError::Schema {
        path: String::new(),
        message: error.to_string(),
    })?;

    let schema = policy_schema();
    let validator = jsonschema::validator_for(&schema).map_err(|error| ConfigError::Schema {
        path: String::new(),
        message: error.to_string(),
    })?;
    if let Some(error) = validator.iter_errors(&instance).next() {
        return Err(ConfigError::Schema {
            path: error.instance_path.to_string(),
            message: error.to_string(),
        });
    }

    let document: PolicyDocument =
        serde_json::from_value(instance).map_err(|error| ConfigError::Schema {
            path: String::new(),
            message: error.to_string(),
        })?;

    let mut overrides = IndexMap::with_capacity(document.policy.overrides.len());
    for (package, version_text) in document.policy.overrides {
        let version: Version =
            version_text
                .parse()
                .map_err(|source| ConfigError::InvalidOverride {
                    package: package.clone(),
                    source,
                })?;
        overrides.insert(package, version);
    }

    Ok(Policy {
        package_months: document.policy.packages,
        default_months: document.policy.default_months,
        channels: document.channels,
        platforms: document.platforms,
        overrides,
        ignored_violations: document.policy.ignored_violations,
        exclude: document.policy.exclude,
    })
}
