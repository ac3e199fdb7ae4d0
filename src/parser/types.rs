//! Common types for environment parsers

use indexmap::IndexMap;

use crate::version::Version;

/// Dialect of an environment manifest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnvironmentKind {
    /// Flat conda `environment.yml` dependency list
    Conda,
    /// Feature-composed pixi manifest (`pixi.toml` or `[tool.pixi]`)
    Pixi,
}

impl EnvironmentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvironmentKind::Conda => "conda",
            EnvironmentKind::Pixi => "pixi",
        }
    }
}

impl std::str::FromStr for EnvironmentKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "conda" => Ok(EnvironmentKind::Conda),
            "pixi" => Ok(EnvironmentKind::Pixi),
            _ => Err(()),
        }
    }
}

/// A declared dependency extracted from an environment manifest.
///
/// `version: None` means the dependency is unpinned.
#[derive(Debug, Clone, PartialEq)]
pub struct Spec {
    pub name: String,
    pub version: Option<Version>,
}

impl Spec {
    pub fn new(name: impl Into<String>, version: Option<Version>) -> Self {
        Self {
            name: name.into(),
            version,
        }
    }
}

/// Pin-style warnings collected per package while parsing. Every parsed
/// package gets an entry, possibly empty; the report assembler appends to it.
pub type Warnings = IndexMap<String, Vec<String>>;

/// An environment's declared dependencies plus the warnings its parser
/// surfaced. `name` is the human-readable environment identifier (file stem
/// for conda, environment name for pixi).
#[derive(Debug, Clone)]
pub struct ParsedEnvironment {
    pub name: String,
    pub specs: Vec<Spec>,
    pub warnings: Warnings,
}
