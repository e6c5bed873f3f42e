//! Command-line interface argument parsing.

use std::path::PathBuf;

use clap::Parser;
use sleep_health_report::config::{Config, OutputFormat};

/// Sleep health report - group means, distributions and correlations
///
/// Examples:
///   sleep-health-report Sleep_health_and_lifestyle_dataset.csv
///   sleep-health-report data/sleep.parquet --format json
///   sleep-health-report --config sleep-report.toml --strict
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Tabular source (.csv, .json or .parquet)
    #[arg(value_name = "DATA", env = "SLEEP_REPORT_DATA")]
    pub data: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for sleep-report.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Fail instead of substituting built-in data when the source cannot be loaded
    #[arg(long)]
    pub strict: bool,

    /// Leave the key findings out of the report
    #[arg(long)]
    pub no_findings: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// CLI values take precedence over the config file; unset flags leave it alone.
    pub fn merge_into(&self, config: &mut Config) {
        if let Some(data) = &self.data {
            config.data.path = data.clone();
        }
        if self.strict {
            config.data.fallback = false;
        }
        if let Some(format) = self.format {
            config.report.format = format;
        }
        if self.no_findings {
            config.report.findings = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config() {
        let args = Args::parse_from([
            "sleep-health-report",
            "x.json",
            "--format",
            "json",
            "--strict",
        ]);
        let mut config = Config::default();
        args.merge_into(&mut config);

        assert_eq!(config.data.path, PathBuf::from("x.json"));
        assert!(!config.data.fallback);
        assert_eq!(config.report.format, OutputFormat::Json);
        assert!(config.report.findings);
    }

    #[test]
    fn no_flags_keep_config() {
        let args = Args {
            data: None,
            config: None,
            format: None,
            strict: false,
            no_findings: false,
            verbose: true,
        };
        let mut config = Config::default();
        config.report.format = OutputFormat::Json;
        let expected = config.clone();
        args.merge_into(&mut config);
        assert_eq!(config, expected);
    }
}
