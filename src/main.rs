//! Dietscape - diet and environmental impact dashboard
//!
//! A CLI tool that summarizes environmental metrics of survey respondents
//! by diet and age cohort, and allocates national water use to the age
//! groups of British consumers, emitting chart-ready panels.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (missing table, invalid metric, unmapped food item, etc.)
//!   2 - A requested panel had no data for the selection

mod analysis;
mod cli;
mod config;
mod context;
mod dashboard;
mod error;
mod loader;
mod models;
mod report;

use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat, View};
use config::{Config, CONFIG_FILE};
use context::ReferenceData;
use dashboard::{ChartPayload, ControlId, Dashboard};
use report::{DashboardReport, ReportMetadata};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("Dietscape v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    let outcome = if args.summarize {
        run_summarize(&args)
    } else {
        run_dashboard(&args)
    };

    match outcome {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Dashboard failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .dietscape.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    println!("   Edit it to customize data files, mappings, and choropleth colors.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Handle --summarize: rebuild the summary workbook from the observations.
fn run_summarize(args: &Args) -> Result<i32> {
    let mut config = load_config(args)?;
    config.merge_with_args(args);

    let observations = config.data.path(&config.data.observations);
    let target = config.data.path(&config.data.summary_workbook);

    println!("📊 Summarizing {}", observations.display());
    let workbook = context::build_workbook(&observations)?;
    loader::save_summary_workbook(&workbook, &target)?;

    for name in workbook.table_names() {
        if let Ok(table) = workbook.table(&name) {
            println!(
                "   {}: {} age groups x {} diet groups",
                name,
                table.row_labels.len(),
                table.column_labels.len()
            );
        }
    }
    println!("\n✅ Summary workbook saved to: {}", target.display());

    Ok(0)
}

/// Compute the requested panels and write them out. Returns exit code (0 or 2).
fn run_dashboard(args: &Args) -> Result<i32> {
    let start_time = Instant::now();

    // Load configuration
    let mut config = load_config(args)?;
    config.merge_with_args(args);

    let metric = config.dashboard.default_metric.clone();
    let age_group = config.dashboard.default_age_group.clone();

    // Step 1: Load the reference tables
    println!(
        "📥 Loading reference data from: {}",
        config.data.data_dir.display()
    );
    let ctx = ReferenceData::load(
        &config.data,
        &config.mappings,
        &config.choropleth,
        !args.quiet,
    )?;

    if !config.dashboard.age_groups.contains(&age_group) {
        warn!("Age group {} is not offered by the selector", age_group);
    }

    // Step 2: Answer the selections
    let dashboard = Dashboard::new(&ctx);
    let panels = match args.view {
        View::All => dashboard.initial_view(&metric, &age_group),
        _ => dashboard.panels(&args.panel_kinds(), &metric, &age_group),
    }
    .context("Failed to compute dashboard panels")?;

    let report = DashboardReport {
        metadata: ReportMetadata {
            generated_at: Utc::now(),
            data_dir: config.data.data_dir.display().to_string(),
            metric: metric.clone(),
            age_group: age_group.clone(),
            metric_options: dashboard.options(ControlId::MetricDropdown, &[]),
            age_group_options: dashboard
                .options(ControlId::AgeGroupDropdown, &config.dashboard.age_groups),
        },
        panels,
    };

    // Step 3: Generate and save the output
    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&report),
    };

    let output_path = Path::new(&config.general.output);
    std::fs::write(output_path, &output)
        .with_context(|| format!("Failed to write output to {}", output_path.display()))?;

    // Print summary
    println!("\n📊 Dashboard Summary:");
    for panel in &report.panels {
        let status = match &panel.figure {
            ChartPayload::Spider(chart) => format!("{} age groups", chart.series.len()),
            ChartPayload::StackedBar(chart) => format!("{} age groups", chart.x.len()),
            ChartPayload::Choropleth(chart) => format!(
                "{} countries with water use",
                chart.countries.iter().filter(|c| c.value > 0.0).count()
            ),
            ChartPayload::NoData { message } => format!("no data ({})", message),
        };
        println!("   {}: {}", panel.id, status);
    }
    println!("   Duration: {:.1}s", start_time.elapsed().as_secs_f64());
    println!("\n✅ Dashboard saved to: {}", output_path.display());

    if report.no_data_count() > 0 {
        eprintln!(
            "\n⛔ {} panel(s) had no data for the selection (exit code 2).",
            report.no_data_count()
        );
        return Ok(2);
    }

    Ok(0)
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
