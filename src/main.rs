mod cli;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, error, info};
use serde::Serialize;

use cli::Args;
use sleep_health_report::config::{Config, OutputFormat};
use sleep_health_report::report::narrative::{key_findings, Finding};
use sleep_health_report::report::render::render_text;
use sleep_health_report::{LookupError, ReportArtifacts, ReportStore};

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn run(args: Args) -> Result<()> {
    info!("sleep-health-report v{}", env!("CARGO_PKG_VERSION"));
    debug!("arguments: {args:?}");

    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?.unwrap_or_default(),
    };
    args.merge_into(&mut config);
    debug!("configuration: {config:?}");

    let store = ReportStore::open(config.data.clone())
        .with_context(|| format!("loading {}", config.data.path.display()))?;
    let report = store.snapshot();
    if let Some(reason) = &report.degraded {
        eprintln!("warning: {reason}; report built from built-in fixture data");
    }

    let findings = if config.report.findings {
        key_findings(&report.accessor())
    } else {
        Vec::new()
    };

    let output = match config.report.format {
        OutputFormat::Text => render_text(&report, &findings).context("rendering report tables")?,
        OutputFormat::Json => {
            serde_json::to_string_pretty(&JsonReport::new(&report, &findings))
                .context("serializing report")?
        }
    };
    println!("{output}");
    Ok(())
}

#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(flatten)]
    report: &'a ReportArtifacts,
    findings: Vec<&'a Finding>,
    omitted_findings: Vec<String>,
}

impl<'a> JsonReport<'a> {
    fn new(report: &'a ReportArtifacts, findings: &'a [Result<Finding, LookupError>]) -> Self {
        JsonReport {
            report,
            findings: findings.iter().filter_map(|f| f.as_ref().ok()).collect(),
            omitted_findings: findings
                .iter()
                .filter_map(|f| f.as_ref().err())
                .map(ToString::to_string)
                .collect(),
        }
    }
}
