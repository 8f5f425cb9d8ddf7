//! Command-line interface for the SLDS validator
//! Walks component directories, validates every bundle and prints what it recommends.
//!
//! Usage:
//!   slds `<path>...` [--config `<file>`] [--format text|json] [--disable `<flag>`]... [--catalog `<file>`]
//!
//! Exit status is 1 when anything is reported, 2 when configuration or catalog
//! data cannot be loaded, 0 otherwise.

mod output;
mod walk;

use clap::{Arg, ArgAction, ArgMatches, Command};
use slds_analysis::{Context, Report, Runner};
use slds_config::{ConfigError, Loader, ReportFormat, SldsConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "SLDS_LOG";
const DEFAULT_CONFIG: &str = "slds.toml";

fn command() -> Command {
    Command::new("slds")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Recommends SLDS design tokens and utility classes for Lightning components")
        .arg_required_else_help(true)
        .arg(
            Arg::new("path")
                .help("Component files or directories to validate")
                .required(true)
                .num_args(1..)
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("Configuration file layered over the defaults (default: ./slds.toml if present)")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .short('f')
                .help("Output format")
                .value_parser(["text", "json"]),
        )
        .arg(
            Arg::new("disable")
                .long("disable")
                .short('d')
                .help("Switch off a validation, e.g. INVALID or SLDS_MOBILE_VALIDATION")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("catalog")
                .long("catalog")
                .help("Design token catalog (JSON) to use instead of the bundled one"),
        )
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(matches: &ArgMatches) -> Result<SldsConfig, ConfigError> {
    let mut loader = match matches.get_one::<PathBuf>("config") {
        Some(path) => Loader::new().with_file(path),
        None => Loader::new().with_optional_file(DEFAULT_CONFIG),
    };
    if let Some(format) = matches.get_one::<String>("format") {
        loader = loader.set_override("report.format", format.as_str())?;
    }
    if let Some(catalog) = matches.get_one::<String>("catalog") {
        loader = loader.set_override("catalog.path", catalog.as_str())?;
    }
    let mut config = loader.build()?;
    if let Some(disabled) = matches.get_many::<String>("disable") {
        config.analysis.disabled.extend(disabled.cloned());
    }
    Ok(config)
}

/// Validates each component on the blocking pool; reports come back in path order.
async fn validate(runner: Arc<Runner>, context: Context, roots: Vec<PathBuf>) -> Vec<Report> {
    let components = walk::component_files(&roots);
    tracing::info!(components = components.len(), "validating");

    let handles: Vec<_> = components
        .into_values()
        .map(|files| {
            let runner = runner.clone();
            let context = context.clone();
            tokio::task::spawn_blocking(move || {
                let bundle = walk::read_bundle(&files);
                runner.run_bundle(&bundle, &context)
            })
        })
        .collect();

    let mut reports = Vec::new();
    for handle in handles {
        match handle.await {
            Ok(found) => reports.extend(found),
            Err(err) => tracing::error!(%err, "component validation failed"),
        }
    }
    reports
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();
    let matches = command().get_matches();

    let config = match load_config(&matches) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Configuration error: {err}");
            return ExitCode::from(2);
        }
    };
    let runner = match config.catalog.runner() {
        Ok(runner) => Arc::new(runner),
        Err(err) => {
            eprintln!("Catalog error: {err}");
            return ExitCode::from(2);
        }
    };

    let roots: Vec<PathBuf> = matches
        .get_many::<PathBuf>("path")
        .map(|paths| paths.cloned().collect())
        .unwrap_or_default();
    if let Some(missing) = roots.iter().find(|root| !root.exists()) {
        eprintln!("No such file or directory: {}", missing.display());
        return ExitCode::from(2);
    }

    let reports = validate(runner, config.analysis.context(), roots).await;
    let rendered = match config.report.format {
        ReportFormat::Text => output::text(&reports, config.report.show_related),
        ReportFormat::Json => match output::json(&reports) {
            Ok(json) => json + "\n",
            Err(err) => {
                eprintln!("Error formatting reports: {err}");
                return ExitCode::from(2);
            }
        },
    };
    print!("{rendered}");

    if reports.iter().any(|report| !report.is_empty()) {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_is_well_formed() {
        command().debug_assert();
    }

    #[test]
    fn cli_flags_layer_over_defaults() {
        let matches = command()
            .try_get_matches_from([
                "slds",
                "force-app",
                "--format",
                "json",
                "--disable",
                "INVALID",
                "-d",
                "density",
            ])
            .expect("arguments to parse");
        let config = load_config(&matches).expect("config");
        assert_eq!(config.report.format, ReportFormat::Json);
        assert_eq!(config.analysis.disabled, vec!["INVALID", "density"]);
    }
}
