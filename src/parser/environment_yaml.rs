//! conda `environment.yml` parser
//!
//! The flat dependency-list dialect: every entry is a spec string such as
//! `numpy=1.23` or a bare package name. Range pins (`>=`, `<=`) are coerced
//! to exact pins with a warning; anything pinned finer than a minor version
//! also warns.

use std::path::Path;

use serde::Deserialize;

use crate::parser::traits::{EnvironmentParser, ParseError};
use crate::parser::types::{EnvironmentKind, ParsedEnvironment, Spec, Warnings};
use crate::version::Version;

pub struct CondaEnvironmentParser;

#[derive(Debug, Deserialize)]
struct EnvironmentFile {
    dependencies: Vec<String>,
}

impl EnvironmentParser for CondaEnvironmentParser {
    fn kind(&self) -> EnvironmentKind {
        EnvironmentKind::Conda
    }

    fn parse(
        &self,
        target: &str,
        _manifest_path: Option<&Path>,
    ) -> Result<ParsedEnvironment, ParseError> {
        let path = Path::new(target);
        let text = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
            path: target.to_string(),
            source,
        })?;
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| target.to_string());

        let environment: EnvironmentFile = serde_yaml::from_str(&text)?;

        let mut specs = Vec::with_capacity(environment.dependencies.len());
        let mut warnings = Warnings::new();
        for dependency in &environment.dependencies {
            let (spec, spec_warnings) = parse_spec(dependency)?;
            warnings.insert(spec.name.clone(), spec_warnings);
            specs.push(spec);
        }

        Ok(ParsedEnvironment {
            name,
            specs,
            warnings,
        })
    }
}

/// Parse one dependency line into a spec plus its pin-style warnings.
pub fn parse_spec(spec_text: &str) -> Result<(Spec, Vec<String>), ParseError> {
    let mut warnings = Vec::new();

    let mut text = spec_text.to_string();
    if text.contains('>') || text.contains('<') {
        warnings.push(format!(
            "package must be pinned with an exact version: {spec_text:?}. \
             Using the version as an exact pin instead."
        ));
        text = text.replace(['>', '<'], "");
    }

    let (spec, version) = match text.split_once('=') {
        Some((name, version_text)) => {
            let version: Version =
                version_text
                    .parse()
                    .map_err(|source| ParseError::InvalidVersion {
                        spec: spec_text.to_string(),
                        source,
                    })?;
            (Spec::new(name, Some(version.clone())), Some(version))
        }
        None => (Spec::new(text, None), None),
    };

    if let Some(version) = version {
        if let Some(warning) = minor_pin_warning(&version) {
            warnings.push(warning);
        }
    }

    Ok((spec, warnings))
}

/// Warn when a version is pinned finer than a minor boundary.
pub(crate) fn minor_pin_warning(version: &Version) -> Option<String> {
    let segments = version.segments();
    let too_fine = match segments.len() {
        3 => segments[2] != 0 || version.is_preview(),
        length => length > 3,
    };
    too_fine.then(|| format!("package should be pinned to a minor version (got {version})"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[rstest]
    #[case("numpy=1.23", "numpy", Some("1.23"))]
    #[case("numpy", "numpy", None)]
    #[case("python-dateutil=2.8", "python-dateutil", Some("2.8"))]
    fn parse_spec_extracts_name_and_version(
        #[case] text: &str,
        #[case] name: &str,
        #[case] version: Option<&str>,
    ) {
        let (spec, warnings) = parse_spec(text).unwrap();

        assert_eq!(spec.name, name);
        assert_eq!(
            spec.version,
            version.map(|v| v.parse().unwrap())
        );
        assert!(warnings.is_empty());
    }

    #[rstest]
    #[case("numpy>=1.23", "1.23")]
    #[case("numpy<=2.0", "2.0")]
    fn range_pins_are_coerced_to_exact_with_a_warning(
        #[case] text: &str,
        #[case] version: &str,
    ) {
        let (spec, warnings) = parse_spec(text).unwrap();

        assert_eq!(spec.version, Some(version.parse().unwrap()));
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("must be pinned with an exact version"));
    }

    #[rstest]
    #[case("numpy=1.23.1")]
    #[case("numpy=1.23.0rc1")]
    #[case("numpy=1.2.3.4")]
    fn pins_finer_than_a_minor_version_warn(#[case] text: &str) {
        let (_, warnings) = parse_spec(text).unwrap();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("should be pinned to a minor version"));
    }

    #[test]
    fn unparseable_version_names_the_offending_spec() {
        let result = parse_spec("numpy=1.23.0.post1");
        assert!(matches!(
            result,
            Err(ParseError::InvalidVersion { spec, .. }) if spec == "numpy=1.23.0.post1"
        ));
    }

    #[rstest]
    #[case("numpy=1.23.0")]
    #[case("numpy=1.23")]
    fn minor_boundary_pins_do_not_warn(#[case] text: &str) {
        let (_, warnings) = parse_spec(text).unwrap();
        assert!(warnings.is_empty());
    }

    #[test]
    fn parse_reads_dependencies_in_declaration_order() {
        let mut file = NamedTempFile::with_suffix(".yml").unwrap();
        write!(
            file,
            "name: test\ndependencies:\n  - numpy=1.23\n  - scipy>=1.1\n  - pandas\n"
        )
        .unwrap();

        let parsed = CondaEnvironmentParser
            .parse(file.path().to_str().unwrap(), None)
            .unwrap();

        let names: Vec<&str> = parsed.specs.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["numpy", "scipy", "pandas"]);
        assert!(parsed.warnings["numpy"].is_empty());
        assert_eq!(parsed.warnings["scipy"].len(), 1);
        assert_eq!(parsed.specs[2].version, None);
    }

    #[test]
    fn environment_name_is_the_file_stem() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("docs.yml");
        std::fs::write(&path, "dependencies: []\n").unwrap();

        let parsed = CondaEnvironmentParser
            .parse(path.to_str().unwrap(), None)
            .unwrap();

        assert_eq!(parsed.name, "docs");
        assert!(parsed.specs.is_empty());
    }

    #[test]
    fn missing_file_reports_the_path() {
        let result = CondaEnvironmentParser.parse("no/such/environment.yml", None);
        assert!(matches!(
            result,
            Err(ParseError::Io { path, .. }) if path == "no/such/environment.yml"
        ));
    }
}
