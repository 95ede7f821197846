//! Chart payload construction.
//!
//! Each builder turns a pipeline result into a renderer-neutral figure
//! description. Undefined values stay `None` (drawn as gaps); zero-filled
//! countries stay `0.0` (drawn as a color).

use crate::analysis::aggregator::{pivot, sum_by_key};
use crate::config::ChoroplethConfig;
use crate::models::{
    CategoryWeights, CountryImpact, CountryImpactResult, PopulationCount, SummaryMatrix,
};
use serde::Serialize;

/// One age group trace on the radar chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpiderSeries {
    pub name: String,
    /// Radial values, first value repeated at the end.
    pub r: Vec<Option<f64>>,
}

/// Radar chart of one summary matrix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpiderChart {
    pub metric: String,
    /// Diet groups, first label repeated at the end to close the polygon.
    pub theta: Vec<String>,
    pub series: Vec<SpiderSeries>,
    pub radial_range: [f64; 2],
}

/// One diet group layer of the stacked bar chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarSeries {
    pub name: String,
    pub y: Vec<Option<f64>>,
}

/// Participant counts per age group, stacked by diet group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StackedBarChart {
    pub x: Vec<String>,
    pub series: Vec<BarSeries>,
    pub barmode: String,
    pub x_label: String,
    pub y_label: String,
}

/// Per-country water use for one age group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoroplethChart {
    pub age_group: String,
    pub countries: Vec<CountryImpact>,
    pub category_weights: CategoryWeights,
    pub color_scale: String,
    pub range_color: [f64; 2],
}

/// Repeat the first element at the end.
fn close_loop<T: Clone>(values: &[T]) -> Vec<T> {
    let mut closed = values.to_vec();
    if let Some(first) = values.first() {
        closed.push(first.clone());
    }
    closed
}

/// Build the radar chart for a summary matrix.
pub fn spider_chart(matrix: &SummaryMatrix) -> SpiderChart {
    let series = matrix
        .row_labels
        .iter()
        .zip(matrix.cells.iter())
        .map(|(age_group, row)| SpiderSeries {
            name: age_group.clone(),
            r: close_loop(row),
        })
        .collect();

    SpiderChart {
        metric: matrix.metric.clone(),
        theta: close_loop(&matrix.column_labels),
        series,
        radial_range: [0.0, matrix.max_value().unwrap_or(0.0)],
    }
}

/// Build the stacked proportion chart from the population counts.
///
/// Repeated (age group, diet group) rows are summed.
pub fn stacked_bar_chart(population: &[PopulationCount]) -> StackedBarChart {
    let totals = sum_by_key(population.iter().map(|p| {
        (
            (p.age_group.clone(), p.diet_group.clone()),
            p.n_participants_proportioned,
        )
    }));
    let table = pivot(totals.into_iter().map(|((age, diet), n)| (age, diet, n)));

    let series = table
        .columns
        .iter()
        .enumerate()
        .map(|(col, diet)| BarSeries {
            name: diet.clone(),
            y: table.cells.iter().map(|row| row[col]).collect(),
        })
        .collect();

    StackedBarChart {
        x: table.rows,
        series,
        barmode: "stack".to_string(),
        x_label: "Age Group".to_string(),
        y_label: "Proportion of Participants".to_string(),
    }
}

/// Build the choropleth for an allocation result.
pub fn choropleth_chart(
    result: &CountryImpactResult,
    settings: &ChoroplethConfig,
) -> ChoroplethChart {
    ChoroplethChart {
        age_group: result.age_group.clone(),
        countries: result.countries.clone(),
        category_weights: result.category_weights,
        color_scale: settings.color_scale.clone(),
        range_color: [settings.range_min, settings.range_max],
    }
}
