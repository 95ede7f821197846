//! Reference table loading.
//!
//! This module reads the static input tables (CSV) and the summary workbook
//! (JSON) into typed records. Loading happens once at startup.

use crate::models::{
    Country, DietaryProportion, Observation, PopulationCount, ResourceUse, SummaryWorkbook,
};
use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

/// Read every row of a CSV file into `T`.
pub fn read_csv<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let mut rows = Vec::new();
    for (i, record) in reader.deserialize().enumerate() {
        let row: T = record
            .with_context(|| format!("Failed to parse row {} of {}", i + 1, path.display()))?;
        rows.push(row);
    }

    debug!("Read {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Load the per-respondent observation table.
///
/// `diet_group` and `age_group` are required; rows with either cell blank
/// belong to no cohort and are dropped. Every other cell that parses as a
/// number becomes a metric on that row. Empty, NaN and non-numeric cells are
/// left out rather than read as zero.
pub fn load_observations(path: &Path) -> Result<Vec<Observation>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let headers = reader
        .headers()
        .with_context(|| format!("Failed to read header of {}", path.display()))?
        .clone();

    let diet_idx = headers.iter().position(|h| h == "diet_group");
    let age_idx = headers.iter().position(|h| h == "age_group");
    let (diet_idx, age_idx) = match (diet_idx, age_idx) {
        (Some(d), Some(a)) => (d, a),
        _ => bail!(
            "{} must have diet_group and age_group columns",
            path.display()
        ),
    };

    let mut observations = Vec::new();
    let mut skipped = 0;
    for (i, record) in reader.records().enumerate() {
        let record =
            record.with_context(|| format!("Failed to read row {} of {}", i + 1, path.display()))?;

        let diet_group = record.get(diet_idx).unwrap_or_default();
        let age_group = record.get(age_idx).unwrap_or_default();
        if diet_group.is_empty() || age_group.is_empty() {
            skipped += 1;
            continue;
        }

        let mut metrics = BTreeMap::new();
        for (col, (name, cell)) in headers.iter().zip(record.iter()).enumerate() {
            if col == diet_idx || col == age_idx {
                continue;
            }
            if let Some(value) = parse_number(cell) {
                metrics.insert(name.to_string(), value);
            }
        }

        observations.push(Observation {
            diet_group: diet_group.to_string(),
            age_group: age_group.to_string(),
            metrics,
        });
    }

    if skipped > 0 {
        info!(
            "Dropped {} observations with no diet group or age group",
            skipped
        );
    }

    info!("Loaded {} observations", observations.len());
    Ok(observations)
}

fn parse_number(cell: &str) -> Option<f64> {
    cell.parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// Load proportioned participant counts.
pub fn load_population_counts(path: &Path) -> Result<Vec<PopulationCount>> {
    read_csv(path)
}

/// Load dietary proportions per diet label.
pub fn load_dietary_proportions(path: &Path) -> Result<Vec<DietaryProportion>> {
    read_csv(path)
}

/// Raw water-use row; any field may be missing.
#[derive(Debug, Deserialize)]
struct WaterUseRow {
    #[serde(rename = "Category")]
    category: Option<String>,
    #[serde(rename = "Country")]
    country: Option<String>,
    #[serde(rename = "Water Use (L)")]
    water_use: Option<f64>,
}

/// Load the water-use table, dropping rows with a missing field.
pub fn load_resource_use(path: &Path) -> Result<Vec<ResourceUse>> {
    let rows: Vec<WaterUseRow> = read_csv(path)?;
    let total = rows.len();

    let entries: Vec<ResourceUse> = rows
        .into_iter()
        .filter_map(|row| match (row.category, row.country, row.water_use) {
            (Some(food_item), Some(country), Some(litres)) if !litres.is_nan() => {
                Some(ResourceUse {
                    food_item,
                    country,
                    water_use_l: litres,
                })
            }
            _ => None,
        })
        .collect();

    if entries.len() < total {
        info!(
            "Dropped {} of {} water-use rows with missing values",
            total - entries.len(),
            total
        );
    }

    Ok(entries)
}

/// Load the country reference list.
pub fn load_countries(path: &Path) -> Result<Vec<Country>> {
    read_csv(path)
}

/// Load a previously written summary workbook.
pub fn load_summary_workbook(path: &Path) -> Result<SummaryWorkbook> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read summary workbook: {}", path.display()))?;

    let workbook: SummaryWorkbook = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse summary workbook: {}", path.display()))?;

    for (name, table) in &workbook.tables {
        if let Err(e) = table.check_shape() {
            bail!(
                "Malformed table {} in summary workbook {}: {}",
                name,
                path.display(),
                e
            );
        }
    }

    Ok(workbook)
}

/// Write a summary workbook as pretty JSON.
pub fn save_summary_workbook(workbook: &SummaryWorkbook, path: &Path) -> Result<()> {
    let content = serde_json::to_string_pretty(workbook)?;

    std::fs::write(path, content)
        .with_context(|| format!("Failed to write summary workbook: {}", path.display()))?;

    info!("Wrote {} summary tables to {}", workbook.tables.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::summarize_all;
    use crate::models::Metric;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn fixture(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("fixtures")
            .join(name)
    }

    #[test]
    fn test_load_observations() {
        let observations = load_observations(&fixture("data.csv")).unwrap();

        assert!(!observations.is_empty());
        let first = &observations[0];
        assert_eq!(first.diet_group, "fish");
        assert_eq!(first.age_group, "20-29");
        assert!(first.metric("mean_bio").is_some());
        // Non-numeric columns are not metrics.
        assert!(first.metric("sex").is_none());
    }

    #[test]
    fn test_observations_require_group_columns() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.csv");
        std::fs::write(&path, "diet,age,mean_bio\nvegan,20-29,1.0\n").unwrap();

        assert!(load_observations(&path).is_err());
    }

    #[test]
    fn test_empty_metric_cell_is_absent() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("obs.csv");
        std::fs::write(
            &path,
            "diet_group,age_group,mean_bio,mean_land\nvegan,20-29,1.5,\nmeat,30-39,NaN,2.0\n",
        )
        .unwrap();

        let observations = load_observations(&path).unwrap();
        assert_eq!(observations[0].metric("mean_bio"), Some(1.5));
        assert_eq!(observations[0].metric("mean_land"), None);
        assert_eq!(observations[1].metric("mean_bio"), None);
    }

    #[test]
    fn test_blank_group_rows_are_dropped() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("obs.csv");
        std::fs::write(
            &path,
            "diet_group,age_group,mean_bio\n,20-29,5.0\n,20-29,9.0\nvegan,,3.0\nvegan,,4.0\n\
             vegan,20-29,1.0\nvegan,20-29,2.0\n",
        )
        .unwrap();

        let observations = load_observations(&path).unwrap();
        assert_eq!(observations.len(), 2);

        let matrix = crate::analysis::summarize(&observations, "mean_bio").unwrap();
        assert_eq!(matrix.row_labels, vec!["20-29"]);
        assert_eq!(matrix.column_labels, vec!["vegan"]);
    }

    #[test]
    fn test_load_reference_tables() {
        let counts = load_population_counts(&fixture("main_data_counts.csv")).unwrap();
        assert!(counts.iter().any(|c| c.age_group == "20-29"));

        let proportions =
            load_dietary_proportions(&fixture("dietary_data_proportioned.csv")).unwrap();
        assert_eq!(proportions.len(), 6);

        let countries = load_countries(&fixture("countries.csv")).unwrap();
        assert!(countries.iter().any(|c| c.iso_a3 == "GBR"));
    }

    #[test]
    fn test_water_use_drops_missing_rows() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("water.csv");
        std::fs::write(
            &path,
            "Category,Country,Water Use (L)\nRice,India,2248.0\nMilk,,628.2\nTofu,China,\n",
        )
        .unwrap();

        let entries = load_resource_use(&path).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].food_item, "Rice");
        assert_eq!(entries[0].water_use_l, 2248.0);
    }

    #[test]
    fn test_workbook_save_and_load() {
        let observations = load_observations(&fixture("data.csv")).unwrap();
        let workbook = summarize_all(&observations, &Metric::ALL).unwrap();

        let temp = TempDir::new().unwrap();
        let path = temp.path().join("summary.json");
        save_summary_workbook(&workbook, &path).unwrap();

        let loaded = load_summary_workbook(&path).unwrap();
        assert_eq!(loaded.table_names(), workbook.table_names());
        assert_eq!(
            loaded.table("mean_land").unwrap().row_labels,
            workbook.table("mean_land").unwrap().row_labels
        );
    }

    #[test]
    fn test_malformed_workbook_is_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("summary.json");
        std::fs::write(
            &path,
            r#"{"tables": {"mean_land": {
                "metric": "mean_land",
                "row_labels": ["20-29", "30-39"],
                "column_labels": ["fish", "meat", "vegan"],
                "cells": [[1.0]],
                "cohort_sizes": [[2]]
            }}}"#,
        )
        .unwrap();

        let err = load_summary_workbook(&path).unwrap_err();
        assert!(err.to_string().contains("mean_land"));
    }

    #[test]
    fn test_missing_file_has_context() {
        let err = load_countries(Path::new("/nonexistent/countries.csv")).unwrap_err();
        assert!(err.to_string().contains("countries.csv"));
    }
}
