//! pixi manifest parser
//!
//! The feature-composed dialect: an environment names a list of features, and
//! its dependency set is the in-order merge of those features' `dependencies`
//! tables (later features override earlier ones). The manifest is either a
//! `pixi.toml` (pixi config at the document root) or any other TOML file with
//! a `[tool.pixi]` table, typically `pyproject.toml`.
//!
//! Version pins use pixi's own grammar:
//! - `*` — unpinned
//! - `x.y.z` / `x.y.*` — exact pin (the `.*` suffix is dropped)
//! - `>=x.y.z` — lower pin, coerced to exact with a warning
//! - `>=a.b.c,<d.e.f` — tight range, lower pin used with a warning

use std::path::Path;
use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use serde::Deserialize;

use crate::parser::environment_yaml::minor_pin_warning;
use crate::parser::traits::{EnvironmentParser, ParseError};
use crate::parser::types::{EnvironmentKind, ParsedEnvironment, Spec, Warnings};
use crate::version::Version;

const VERSION_PATTERN: &str = r"[0-9]+\.[0-9]+(?:\.[0-9]+|\.\*)";

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("^(?P<version>{VERSION_PATTERN})")).expect("valid regex")
});
static LOWER_PIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("^>=(?P<version>{VERSION_PATTERN})$")).expect("valid regex")
});
static TIGHT_PIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        "^>=(?P<lower>{VERSION_PATTERN}),<(?P<upper>{VERSION_PATTERN})"
    ))
    .expect("valid regex")
});

pub struct PixiManifestParser;

#[derive(Debug, Deserialize)]
struct PixiConfig {
    environments: Option<IndexMap<String, PixiEnvironment>>,
    feature: Option<IndexMap<String, PixiFeature>>,
}

#[derive(Debug, Deserialize)]
struct PixiEnvironment {
    features: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct PixiFeature {
    #[serde(default)]
    dependencies: IndexMap<String, String>,
}

impl EnvironmentParser for PixiManifestParser {
    fn kind(&self) -> EnvironmentKind {
        EnvironmentKind::Pixi
    }

    fn parse(
        &self,
        target: &str,
        manifest_path: Option<&Path>,
    ) -> Result<ParsedEnvironment, ParseError> {
        let manifest_path = manifest_path.ok_or(ParseError::MissingManifestPath)?;
        let text = std::fs::read_to_string(manifest_path).map_err(|source| ParseError::Io {
            path: manifest_path.display().to_string(),
            source,
        })?;
        let document: toml::Value = toml::from_str(&text)?;

        let config = locate_pixi_config(&document, manifest_path)?;
        let pins = compose_environment(&config, target)?;

        let mut specs = Vec::with_capacity(pins.len());
        let mut warnings = Warnings::new();
        for (name, pin) in &pins {
            let (spec, spec_warnings) = parse_spec(name, pin)?;
            warnings.insert(spec.name.clone(), spec_warnings);
            specs.push(spec);
        }

        Ok(ParsedEnvironment {
            name: target.to_string(),
            specs,
            warnings,
        })
    }
}

/// The pixi config lives at the document root of a `pixi.toml`, and under
/// `[tool.pixi]` everywhere else.
fn locate_pixi_config(document: &toml::Value, path: &Path) -> Result<PixiConfig, ParseError> {
    let table = if path.file_name().is_some_and(|name| name == "pixi.toml") {
        document.clone()
    } else {
        document
            .get("tool")
            .and_then(|tool| tool.get("pixi"))
            .cloned()
            .ok_or_else(|| ParseError::MissingPixiSection {
                path: path.display().to_string(),
            })?
    };
    Ok(table.try_into()?)
}

/// Merge the dependency tables of the environment's features, in feature
/// order, later features overriding earlier ones.
fn compose_environment(
    config: &PixiConfig,
    environment: &str,
) -> Result<IndexMap<String, String>, ParseError> {
    let environments = config
        .environments
        .as_ref()
        .ok_or(ParseError::MissingEnvironments)?;
    let features = config.feature.as_ref().ok_or(ParseError::MissingFeatures)?;

    let definition = environments
        .get(environment)
        .ok_or_else(|| ParseError::UnknownEnvironment(environment.to_string()))?;

    let mut pins = IndexMap::new();
    for feature_name in &definition.features {
        let feature =
            features
                .get(feature_name)
                .ok_or_else(|| ParseError::UnknownFeature {
                    feature: feature_name.clone(),
                    environment: environment.to_string(),
                })?;
        for (name, pin) in &feature.dependencies {
            pins.insert(name.clone(), pin.clone());
        }
    }
    Ok(pins)
}

/// Parse one pixi version pin into a spec plus its pin-style warnings.
pub fn parse_spec(name: &str, version_text: &str) -> Result<(Spec, Vec<String>), ParseError> {
    let mut warnings = Vec::new();

    let raw_version = if version_text == "*" {
        None
    } else if let Some(captures) = VERSION_RE.captures(version_text) {
        Some(captures["version"].to_string())
    } else if let Some(captures) = LOWER_PIN_RE.captures(version_text) {
        warnings.push(format!(
            "package must be pinned with an exact version: {version_text:?}. \
             Using the version as an exact pin instead."
        ));
        Some(captures["version"].to_string())
    } else if let Some(captures) = TIGHT_PIN_RE.captures(version_text) {
        let lower = &captures["lower"];
        let upper = &captures["upper"];
        warnings.push(format!(
            "lower pin {lower:?} and upper pin {upper:?} found. Using the lower \
             pin for now, please convert to the standard x.y.* syntax."
        ));
        Some(lower.to_string())
    } else {
        return Err(ParseError::UnknownVersionFormat(version_text.to_string()));
    };

    let version = match raw_version {
        Some(raw) => {
            let version: Version = raw
                .strip_suffix(".*")
                .unwrap_or(&raw)
                .parse()
                .map_err(|source| ParseError::InvalidVersion {
                    spec: format!("{name}={version_text}"),
                    source,
                })?;
            if let Some(warning) = minor_pin_warning(&version) {
                warnings.push(warning);
            }
            Some(version)
        }
        None => None,
    };

    Ok((Spec::new(name, version), warnings))
}
