//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::dashboard::PanelKind;
use crate::models::Metric;
use clap::Parser;
use std::path::PathBuf;

/// Dietscape - diet and environmental impact dashboard
///
/// Summarizes the spread of environmental metrics across diet and age
/// cohorts and allocates national water use to age groups of British
/// consumers. Emits chart-ready JSON or Markdown tables.
///
/// Examples:
///   dietscape --data-dir ./data
///   dietscape --metric mean_ghgs --view spider
///   dietscape --age-group 50-59 --view choropleth --format markdown
///   dietscape --summarize
///   dietscape --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to configuration file
    ///
    /// If not specified, looks for .dietscape.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory holding the input tables
    #[arg(long, value_name = "DIR", env = "DIETSCAPE_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Metric table shown on the radar chart
    ///
    /// Values: mean_bio, mean_land, mean_watuse, mean_eut, mean_ghgs
    #[arg(short, long, value_name = "METRIC")]
    pub metric: Option<String>,

    /// Age group shown on the choropleth (e.g. 20-29)
    #[arg(short, long, value_name = "GROUP")]
    pub age_group: Option<String>,

    /// Which panels to compute
    #[arg(long, default_value = "all", value_name = "VIEW")]
    pub view: View,

    /// Output format (json, markdown)
    #[arg(long, default_value = "json", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Output file path for the panels
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Recompute the summary workbook from the observation table and exit
    #[arg(long)]
    pub summarize: bool,

    /// Generate a default .dietscape.toml configuration file
    #[arg(long)]
    pub init_config: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,
}

/// Output format for the panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON chart payloads (default)
    #[default]
    Json,
    /// Markdown tables
    Markdown,
}

/// Panel selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum View {
    #[default]
    All,
    Spider,
    Stacked,
    Choropleth,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref metric) = self.metric {
            if let Err(e) = metric.parse::<Metric>() {
                return Err(e.to_string());
            }
        }

        if let Some(ref age_group) = self.age_group {
            if age_group.trim().is_empty() {
                return Err("Age group must not be empty".to_string());
            }
        }

        // Validate data directory if provided
        if let Some(ref dir) = self.data_dir {
            if !dir.exists() {
                return Err(format!("Data directory does not exist: {}", dir.display()));
            }
            if !dir.is_dir() {
                return Err(format!("Data path is not a directory: {}", dir.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Panels selected by --view.
    pub fn panel_kinds(&self) -> Vec<PanelKind> {
        match self.view {
            View::All => PanelKind::ALL.to_vec(),
            View::Spider => vec![PanelKind::Spider],
            View::Stacked => vec![PanelKind::StackedBar],
            View::Choropleth => vec![PanelKind::Choropleth],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            config: None,
            data_dir: None,
            metric: None,
            age_group: None,
            view: View::All,
            format: OutputFormat::Json,
            output: None,
            summarize: false,
            init_config: false,
            verbose: false,
            quiet: false,
        }
    }

    #[test]
    fn test_validation_defaults() {
        assert!(make_args().validate().is_ok());
    }

    #[test]
    fn test_validation_unknown_metric() {
        let mut args = make_args();
        args.metric = Some("mean_acid".to_string());
        assert!(args.validate().is_err());

        args.metric = Some("mean_watuse".to_string());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_missing_data_dir() {
        let mut args = make_args();
        args.data_dir = Some(PathBuf::from("/nonexistent/dietscape"));
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }

    #[test]
    fn test_panel_kinds() {
        let mut args = make_args();
        assert_eq!(args.panel_kinds().len(), 3);

        args.view = View::Choropleth;
        assert_eq!(args.panel_kinds(), vec![PanelKind::Choropleth]);
    }

    #[test]
    fn test_parse_from_command_line() {
        let args = Args::try_parse_from([
            "dietscape",
            "--metric",
            "mean_land",
            "-a",
            "30-39",
            "--view",
            "stacked",
            "--format",
            "markdown",
        ])
        .unwrap();

        assert_eq!(args.metric.as_deref(), Some("mean_land"));
        assert_eq!(args.age_group.as_deref(), Some("30-39"));
        assert_eq!(args.view, View::Stacked);
        assert_eq!(args.format, OutputFormat::Markdown);
    }
}
