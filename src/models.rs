//! Data models for the dashboard.
//!
//! This module contains the records loaded from the reference tables and the
//! derived structures (summary matrices, category weights, country impacts)
//! produced by the aggregation pipeline.

use crate::error::DashboardError;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Age buckets offered by the age-group selector.
pub const AGE_GROUPS: [&str; 6] = ["20-29", "30-39", "40-49", "50-59", "60-69", "70-79"];

/// Environmental metric summarized per cohort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Biodiversity impact
    MeanBio,
    /// Land use
    MeanLand,
    /// Water use
    MeanWatuse,
    /// Eutrophication potential
    MeanEut,
    /// Greenhouse gas emissions
    MeanGhgs,
}

impl Metric {
    /// All summarized metrics, in selector order.
    pub const ALL: [Metric; 5] = [
        Metric::MeanBio,
        Metric::MeanLand,
        Metric::MeanWatuse,
        Metric::MeanEut,
        Metric::MeanGhgs,
    ];

    /// Column name of the metric in the observation table.
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::MeanBio => "mean_bio",
            Metric::MeanLand => "mean_land",
            Metric::MeanWatuse => "mean_watuse",
            Metric::MeanEut => "mean_eut",
            Metric::MeanGhgs => "mean_ghgs",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Metric {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metric::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| DashboardError::InvalidMetric(s.to_string()))
    }
}

/// Coarse food category linking dietary proportions to resource-use data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FoodCategory {
    Grains,
    Potatoes,
    Beans,
    Fruit,
    Meat,
    Fish,
    Cheese,
    Milk,
    Yogurt,
}

impl FoodCategory {
    pub const ALL: [FoodCategory; 9] = [
        FoodCategory::Grains,
        FoodCategory::Potatoes,
        FoodCategory::Beans,
        FoodCategory::Fruit,
        FoodCategory::Meat,
        FoodCategory::Fish,
        FoodCategory::Cheese,
        FoodCategory::Milk,
        FoodCategory::Yogurt,
    ];

    /// Position of the category in [`FoodCategory::ALL`].
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FoodCategory::Grains => "Grains",
            FoodCategory::Potatoes => "Potatoes",
            FoodCategory::Beans => "Beans",
            FoodCategory::Fruit => "Fruit",
            FoodCategory::Meat => "Meat",
            FoodCategory::Fish => "Fish",
            FoodCategory::Cheese => "Cheese",
            FoodCategory::Milk => "Milk",
            FoodCategory::Yogurt => "Yogurt",
        }
    }
}

impl fmt::Display for FoodCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One value per coarse food category.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CategoryWeights([f64; 9]);

impl CategoryWeights {
    pub fn new(values: [f64; 9]) -> Self {
        Self(values)
    }

    pub fn get(&self, category: FoodCategory) -> f64 {
        self.0[category.index()]
    }

    /// Returns a copy with every category multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        let mut out = self.0;
        for value in out.iter_mut() {
            *value *= factor;
        }
        Self(out)
    }

    /// Elementwise accumulate `other` into `self`.
    pub fn accumulate(&mut self, other: &CategoryWeights) {
        for (acc, value) in self.0.iter_mut().zip(other.0.iter()) {
            *acc += value;
        }
    }

    /// Iterate `(category, value)` pairs in category order.
    pub fn iter(&self) -> impl Iterator<Item = (FoodCategory, f64)> + '_ {
        FoodCategory::ALL.iter().map(move |c| (*c, self.get(*c)))
    }
}

impl Serialize for CategoryWeights {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(FoodCategory::ALL.len()))?;
        for (category, value) in self.iter() {
            map.serialize_entry(category.as_str(), &value)?;
        }
        map.end()
    }
}

/// One survey respondent record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub diet_group: String,
    pub age_group: String,
    /// Numeric environmental metrics keyed by column name.
    pub metrics: BTreeMap<String, f64>,
}

impl Observation {
    /// Value of a metric on this record, if present and numeric.
    pub fn metric(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).copied()
    }
}

/// Proportioned participant count for one (age group, diet group) cohort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationCount {
    pub age_group: String,
    pub diet_group: String,
    pub n_participants_proportioned: f64,
}

/// Share of dietary intake per coarse category for one diet label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DietaryProportion {
    #[serde(rename = "Diet")]
    pub diet: String,
    #[serde(rename = "Grains")]
    pub grains: f64,
    #[serde(rename = "Potatoes")]
    pub potatoes: f64,
    #[serde(rename = "Beans")]
    pub beans: f64,
    #[serde(rename = "Fruit")]
    pub fruit: f64,
    #[serde(rename = "Meat")]
    pub meat: f64,
    #[serde(rename = "Fish")]
    pub fish: f64,
    #[serde(rename = "Cheese")]
    pub cheese: f64,
    #[serde(rename = "Milk")]
    pub milk: f64,
    #[serde(rename = "Yogurt")]
    pub yogurt: f64,
}

impl DietaryProportion {
    /// The nine category shares as weights.
    pub fn weights(&self) -> CategoryWeights {
        CategoryWeights::new([
            self.grains,
            self.potatoes,
            self.beans,
            self.fruit,
            self.meat,
            self.fish,
            self.cheese,
            self.milk,
            self.yogurt,
        ])
    }
}

/// Water needed to produce one unit of a food item in a country.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceUse {
    pub food_item: String,
    pub country: String,
    pub water_use_l: f64,
}

/// Geographic reference entry used for the choropleth join.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Country {
    pub name: String,
    pub iso_a3: String,
}

/// Standard deviation of one metric, age groups by diet groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryMatrix {
    pub metric: String,
    /// Age groups, one per row.
    pub row_labels: Vec<String>,
    /// Diet groups, one per column.
    pub column_labels: Vec<String>,
    /// `None` marks an undefined cell (missing or under-populated cohort).
    pub cells: Vec<Vec<Option<f64>>>,
    /// Number of values that fed each cell.
    pub cohort_sizes: Vec<Vec<usize>>,
}

impl SummaryMatrix {
    /// Cell for an (age group, diet group) pair.
    pub fn get(&self, age_group: &str, diet_group: &str) -> Option<f64> {
        let row = self.row_labels.iter().position(|r| r == age_group)?;
        let col = self.column_labels.iter().position(|c| c == diet_group)?;
        self.cells.get(row)?.get(col).copied().flatten()
    }

    /// Check that `cells` and `cohort_sizes` hold one entry per label pair.
    pub fn check_shape(&self) -> Result<(), String> {
        let rows = self.row_labels.len();
        let cols = self.column_labels.len();

        if self.cells.len() != rows || self.cells.iter().any(|r| r.len() != cols) {
            return Err(format!(
                "cells do not form a {} x {} grid of age groups by diet groups",
                rows, cols
            ));
        }
        if self.cohort_sizes.len() != rows || self.cohort_sizes.iter().any(|r| r.len() != cols) {
            return Err(format!(
                "cohort sizes do not form a {} x {} grid of age groups by diet groups",
                rows, cols
            ));
        }
        Ok(())
    }

    /// Largest defined cell, if any.
    pub fn max_value(&self) -> Option<f64> {
        self.cells
            .iter()
            .flatten()
            .flatten()
            .copied()
            .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))))
    }
}

/// Labeled collection of summary matrices, one per metric.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryWorkbook {
    pub tables: BTreeMap<String, SummaryMatrix>,
}

impl SummaryWorkbook {
    /// Look up the table for a metric name.
    pub fn table(&self, name: &str) -> Result<&SummaryMatrix, DashboardError> {
        self.tables
            .get(name)
            .ok_or_else(|| DashboardError::InvalidMetric(name.to_string()))
    }

    /// Table names in selector order: known metrics first, then any extras.
    pub fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Metric::ALL
            .iter()
            .map(|m| m.as_str().to_string())
            .filter(|n| self.tables.contains_key(n))
            .collect();
        for name in self.tables.keys() {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
        names
    }
}

/// Joined per-country value ready for the choropleth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryImpact {
    pub country: String,
    pub iso_a3: String,
    pub value: f64,
    pub bubble_size: f64,
}

/// Per-country water-use estimate for one age group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryImpactResult {
    pub age_group: String,
    pub category_weights: CategoryWeights,
    /// Estimates before the geographic join, keyed by country name.
    pub estimates: BTreeMap<String, f64>,
    /// One row per reference country; zero where no estimate exists.
    pub countries: Vec<CountryImpact>,
    /// Estimate countries with no geographic reference entry.
    pub unmatched_countries: Vec<String>,
}

impl CountryImpactResult {
    /// Sum of the pre-join estimates.
    pub fn estimate_total(&self) -> f64 {
        self.estimates.values().sum()
    }
}
