//! Environment parser layer
//! - traits.rs: EnvironmentParser trait and ParseError
//! - types.rs: Common types (Spec, ParsedEnvironment, EnvironmentKind)
//! - environment_yaml.rs: conda `environment.yml` parser
//! - pixi_toml.rs: feature-composed pixi manifest parser
//!
//! Environments are addressed by `kind:target` specifiers on the command
//! line: `conda:ci/environment.yml` parses a file, `pixi:default` selects an
//! environment from the manifest given via `--manifest-path`.

pub mod environment_yaml;
pub mod pixi_toml;
pub mod traits;
pub mod types;

pub use environment_yaml::CondaEnvironmentParser;
pub use pixi_toml::PixiManifestParser;
pub use traits::{EnvironmentParser, ParseError};
pub use types::{EnvironmentKind, ParsedEnvironment, Spec, Warnings};

use std::path::Path;

/// Parse the environment addressed by a `kind:target` specifier.
pub fn parse_environment(
    specifier: &str,
    manifest_path: Option<&Path>,
) -> Result<ParsedEnvironment, ParseError> {
    let (kind, target) = specifier
        .split_once(':')
        .ok_or_else(|| ParseError::InvalidSpecifier {
            specifier: specifier.to_string(),
        })?;

    match kind.parse::<EnvironmentKind>() {
        Ok(EnvironmentKind::Conda) => CondaEnvironmentParser.parse(target, manifest_path),
        Ok(EnvironmentKind::Pixi) => PixiManifestParser.parse(target, manifest_path),
        Err(()) => Err(ParseError::UnknownKind {
            kind: kind.to_string(),
            specifier: specifier.to_string(),
        }),
    }
}
