//! Parser trait definition

use std::path::Path;

use crate::parser::types::{EnvironmentKind, ParsedEnvironment};

/// Trait for parsing environment manifests
pub trait EnvironmentParser {
    /// The dialect this parser handles
    fn kind(&self) -> EnvironmentKind;

    /// Parse one environment.
    ///
    /// `target` is the dialect-specific part of the specifier: a file path
    /// for conda, an environment name for pixi. `manifest_path` is the
    /// `--manifest-path` option, required by feature-composed dialects.
    fn parse(
        &self,
        target: &str,
        manifest_path: Option<&Path>,
    ) -> Result<ParsedEnvironment, ParseError>;
}

/// Error type for environment parsing
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid environment file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid manifest: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid environment specifier {specifier:?}, expected kind:target")]
    InvalidSpecifier { specifier: String },

    #[error("unknown kind {kind:?}, extracted from {specifier:?}")]
    UnknownKind { kind: String, specifier: String },

    #[error("invalid version in {spec:?}: {source}")]
    InvalidVersion {
        spec: String,
        #[source]
        source: crate::version::VersionError,
    },

    #[error("unknown version format: {0}")]
    UnknownVersionFormat(String),

    #[error("--manifest-path is required for pixi environments")]
    MissingManifestPath,

    #[error("the 'tool.pixi' section is missing from {path}")]
    MissingPixiSection { path: String },

    #[error("can't find environments in the pixi config")]
    MissingEnvironments,

    #[error("no features found in the pixi config")]
    MissingFeatures,

    #[error("unknown environment: {0}")]
    UnknownEnvironment(String),

    #[error("unknown feature {feature:?} referenced by environment {environment:?}")]
    UnknownFeature {
        feature: String,
        environment: String,
    },
}
