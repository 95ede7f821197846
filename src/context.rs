//! Immutable reference data shared by every dashboard computation.
//!
//! `ReferenceData` is built once at startup from the configured files and
//! passed by reference to the summarizer lookups and the allocator.

use crate::analysis::{summarize_all, DietLabels, FoodCategoryMapping};
use crate::config::{ChoroplethConfig, DataConfig, MappingConfig};
use crate::loader;
use crate::models::{
    Country, DietaryProportion, Metric, PopulationCount, ResourceUse, SummaryWorkbook,
};
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use tracing::info;

/// Static reference tables, read-only after load.
#[derive(Debug, Clone)]
pub struct ReferenceData {
    /// Standard deviation tables, one per metric.
    pub workbook: SummaryWorkbook,
    pub population: Vec<PopulationCount>,
    pub proportions: Vec<DietaryProportion>,
    pub resource_use: Vec<ResourceUse>,
    pub countries: Vec<Country>,
    pub food_mapping: FoodCategoryMapping,
    pub diet_labels: DietLabels,
    pub choropleth: ChoroplethConfig,
}

impl ReferenceData {
    /// Load every reference table.
    ///
    /// The summary workbook is read from disk when present; otherwise it is
    /// computed from the observation table.
    pub fn load(
        data: &DataConfig,
        mappings: &MappingConfig,
        choropleth: &ChoroplethConfig,
        show_progress: bool,
    ) -> Result<Self> {
        let pb = if show_progress {
            let pb = ProgressBar::new(5);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            pb
        } else {
            ProgressBar::hidden()
        };

        pb.set_message("summary workbook");
        let workbook = load_or_build_workbook(data)?;
        pb.inc(1);

        pb.set_message("population counts");
        let population = loader::load_population_counts(&data.path(&data.population_counts))?;
        pb.inc(1);

        pb.set_message("dietary proportions");
        let proportions =
            loader::load_dietary_proportions(&data.path(&data.dietary_proportions))?;
        pb.inc(1);

        pb.set_message("water use");
        let resource_use = loader::load_resource_use(&data.path(&data.water_use))?;
        pb.inc(1);

        pb.set_message("countries");
        let countries = loader::load_countries(&data.path(&data.countries))?;
        pb.inc(1);

        pb.finish_and_clear();

        let food_mapping = FoodCategoryMapping::from_table(&mappings.food_categories)
            .context("Invalid food category mapping")?;
        let diet_labels = DietLabels::new(mappings.diet_labels.clone());

        info!(
            "Reference data ready: {} tables, {} cohorts, {} water-use rows, {} countries, {} mapped food items",
            workbook.tables.len(),
            population.len(),
            resource_use.len(),
            countries.len(),
            food_mapping.len()
        );

        Ok(Self {
            workbook,
            population,
            proportions,
            resource_use,
            countries,
            food_mapping,
            diet_labels,
            choropleth: choropleth.clone(),
        })
    }
}

/// Read the workbook file, or summarize the observations when it is absent.
fn load_or_build_workbook(data: &DataConfig) -> Result<SummaryWorkbook> {
    let workbook_path = data.path(&data.summary_workbook);
    if workbook_path.exists() {
        return loader::load_summary_workbook(&workbook_path);
    }

    info!(
        "No summary workbook at {}, summarizing observations",
        workbook_path.display()
    );
    build_workbook(&data.path(&data.observations))
}

/// Summarize the observation table over every metric.
pub fn build_workbook(observations_path: &Path) -> Result<SummaryWorkbook> {
    let observations = loader::load_observations(observations_path)?;
    let workbook = summarize_all(&observations, &Metric::ALL)
        .with_context(|| format!("Failed to summarize {}", observations_path.display()))?;
    Ok(workbook)
}

#[cfg(test)]
impl ReferenceData {
    /// Context over in-memory tables with default mappings and an empty workbook.
    pub fn for_tests(
        population: Vec<PopulationCount>,
        proportions: Vec<DietaryProportion>,
        resource_use: Vec<ResourceUse>,
        countries: Vec<Country>,
    ) -> Self {
        Self {
            workbook: SummaryWorkbook::default(),
            population,
            proportions,
            resource_use,
            countries,
            food_mapping: FoodCategoryMapping::default(),
            diet_labels: DietLabels::default(),
            choropleth: ChoroplethConfig::default(),
        }
    }
}
