//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.dietscape.toml` files.

use crate::analysis::mapping::{default_diet_labels, default_food_categories};
use crate::models::{Metric, AGE_GROUPS};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Default configuration file name.
pub const CONFIG_FILE: &str = ".dietscape.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Input data locations.
    #[serde(default)]
    pub data: DataConfig,

    /// Selector defaults.
    #[serde(default)]
    pub dashboard: DashboardConfig,

    /// Choropleth display settings.
    #[serde(default)]
    pub choropleth: ChoroplethConfig,

    /// Static lookup tables.
    #[serde(default)]
    pub mappings: MappingConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
        }
    }
}

fn default_output() -> String {
    "dashboard.json".to_string()
}

/// Input file locations, relative to `data_dir`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Directory holding the input files.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Per-respondent observation table.
    #[serde(default = "default_observations")]
    pub observations: String,

    /// Proportioned participant counts per cohort.
    #[serde(default = "default_population_counts")]
    pub population_counts: String,

    /// Dietary proportions per diet label.
    #[serde(default = "default_dietary_proportions")]
    pub dietary_proportions: String,

    /// Water use per food item and country.
    #[serde(default = "default_water_use")]
    pub water_use: String,

    /// Country names and ISO-3 codes.
    #[serde(default = "default_countries")]
    pub countries: String,

    /// Precomputed summary tables (JSON).
    #[serde(default = "default_summary_workbook")]
    pub summary_workbook: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            observations: default_observations(),
            population_counts: default_population_counts(),
            dietary_proportions: default_dietary_proportions(),
            water_use: default_water_use(),
            countries: default_countries(),
            summary_workbook: default_summary_workbook(),
        }
    }
}

impl DataConfig {
    /// Resolve a file name against `data_dir`.
    pub fn path(&self, file: &str) -> PathBuf {
        self.data_dir.join(file)
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_observations() -> String {
    "data.csv".to_string()
}

fn default_population_counts() -> String {
    "main_data_counts.csv".to_string()
}

fn default_dietary_proportions() -> String {
    "dietary_data_proportioned.csv".to_string()
}

fn default_water_use() -> String {
    "supple_agg_df_water.csv".to_string()
}

fn default_countries() -> String {
    "countries.csv".to_string()
}

fn default_summary_workbook() -> String {
    "summary_workbook.json".to_string()
}

/// Selector defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Metric shown when none is selected.
    #[serde(default = "default_metric")]
    pub default_metric: String,

    /// Age group shown when none is selected.
    #[serde(default = "default_age_group")]
    pub default_age_group: String,

    /// Age groups offered by the selector.
    #[serde(default = "default_age_groups")]
    pub age_groups: Vec<String>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            default_metric: default_metric(),
            default_age_group: default_age_group(),
            age_groups: default_age_groups(),
        }
    }
}

fn default_metric() -> String {
    Metric::MeanBio.as_str().to_string()
}

fn default_age_group() -> String {
    AGE_GROUPS[0].to_string()
}

fn default_age_groups() -> Vec<String> {
    AGE_GROUPS.iter().map(|s| s.to_string()).collect()
}

/// Choropleth display settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoroplethConfig {
    /// Continuous color scale name.
    #[serde(default = "default_color_scale")]
    pub color_scale: String,

    /// Lower bound of the color range.
    #[serde(default)]
    pub range_min: f64,

    /// Upper bound of the color range.
    #[serde(default = "default_range_max")]
    pub range_max: f64,

    /// Multiplier from estimate to marker size.
    #[serde(default = "default_bubble_scale")]
    pub bubble_scale: f64,
}

impl Default for ChoroplethConfig {
    fn default() -> Self {
        Self {
            color_scale: default_color_scale(),
            range_min: 0.0,
            range_max: default_range_max(),
            bubble_scale: default_bubble_scale(),
        }
    }
}

fn default_color_scale() -> String {
    "Brwnyl".to_string()
}

fn default_range_max() -> f64 {
    10000.0
}

fn default_bubble_scale() -> f64 {
    100.0
}

/// Static lookup tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingConfig {
    /// Diet code to dietary-proportion label.
    #[serde(default = "default_diet_labels")]
    pub diet_labels: BTreeMap<String, String>,

    /// Coarse food category to food items.
    #[serde(default = "default_food_categories")]
    pub food_categories: BTreeMap<String, Vec<String>>,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            diet_labels: default_diet_labels(),
            food_categories: default_food_categories(),
        }
    }
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// Only explicitly provided values override.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref dir) = args.data_dir {
            self.data.data_dir = dir.clone();
        }
        if let Some(ref metric) = args.metric {
            self.dashboard.default_metric = metric.clone();
        }
        if let Some(ref age_group) = args.age_group {
            self.dashboard.default_age_group = age_group.clone();
        }
        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
