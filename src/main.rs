use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use indexmap::IndexMap;

use minimum_versions::checker::compare_environments;
use minimum_versions::config::load_policy;
use minimum_versions::output::render_environment;
use minimum_versions::parser::types::{Spec, Warnings};
use minimum_versions::parser::parse_environment;
use minimum_versions::policy::find_policy_versions;
use minimum_versions::registry::{CondaGateway, fetch_release_catalog};
use minimum_versions::report::assemble;

#[derive(Parser)]
#[command(name = "minimum-versions")]
#[command(version, about = "Check pinned dependencies against an age-based minimum version policy")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate environments against the version policy
    Validate {
        /// Environment specifiers, e.g. conda:ci/environment.yml or pixi:default
        environments: Vec<String>,

        /// Policy definition file
        #[arg(long, value_name = "FILE")]
        policy: PathBuf,

        /// Manifest backing pixi environments
        #[arg(long, value_name = "PATH")]
        manifest_path: Option<PathBuf>,

        /// Reference date (YYYY-MM-DD); defaults to the current date
        #[arg(long, value_parser = parse_date)]
        today: Option<NaiveDate>,
    },
}

fn parse_date(text: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Validate {
            environments,
            policy,
            manifest_path,
            today,
        } => validate(environments, policy, manifest_path, today),
    };

    match result {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

fn validate(
    environment_specifiers: Vec<String>,
    policy_file: PathBuf,
    manifest_path: Option<PathBuf>,
    today: Option<NaiveDate>,
) -> anyhow::Result<ExitCode> {
    let policy = load_policy(&policy_file)
        .with_context(|| format!("failed to load policy from {}", policy_file.display()))?;

    // Parse every environment up front; any parse failure aborts the run
    // before the fetch. Excluded packages are dropped from the spec lists but
    // keep their warning entries.
    let mut environments: IndexMap<String, Vec<Spec>> = IndexMap::new();
    let mut warnings: IndexMap<String, Warnings> = IndexMap::new();
    for specifier in &environment_specifiers {
        let parsed = parse_environment(specifier, manifest_path.as_deref())?;
        warnings.insert(parsed.name.clone(), parsed.warnings);
        environments.insert(
            parsed.name,
            parsed
                .specs
                .into_iter()
                .filter(|spec| !policy.exclude.contains(&spec.name))
                .collect(),
        );
    }

    // The ordered, deduplicated union of all declared packages drives the
    // batched fetch and the policy computation.
    let mut all_packages: Vec<String> = Vec::new();
    for spec in environments.values().flatten() {
        if !all_packages.contains(&spec.name) {
            all_packages.push(spec.name.clone());
        }
    }

    let gateway = CondaGateway::default();
    let catalog = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(fetch_release_catalog(&gateway, &policy, &all_packages))?;

    // The only place the clock is read; everything below is deterministic.
    let today = today.unwrap_or_else(|| Local::now().date_naive());

    let policy_versions = find_policy_versions(&policy, today, &all_packages, &catalog)?;
    let status = compare_environments(&environments, &policy_versions, &policy.ignored_violations)?;

    let empty = Warnings::new();
    for (environment, specs) in &environments {
        let environment_warnings = warnings.get(environment).unwrap_or(&empty);
        let (rows, environment_warnings) = assemble(
            specs,
            &policy_versions,
            &catalog,
            environment_warnings,
            &policy.ignored_violations,
        )?;
        print!(
            "{}",
            render_environment(environment, &rows, &environment_warnings)
        );
    }

    if status.values().any(|failed| *failed) {
        Ok(ExitCode::from(1))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
