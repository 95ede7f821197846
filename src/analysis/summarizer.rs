//! Metric summarizer.
//!
//! Reduces per-respondent observations into the standard deviation of a
//! metric per (age group, diet group) cohort, shaped as an age-by-diet matrix.

use super::aggregator::{group_values, pivot, sample_std_dev};
use crate::error::DashboardError;
use crate::models::{Metric, Observation, SummaryMatrix, SummaryWorkbook};
use tracing::debug;

/// Summarize one metric into a [`SummaryMatrix`].
///
/// Cohorts with fewer than two values produce an undefined (`None`) cell.
pub fn summarize(
    observations: &[Observation],
    metric: &str,
) -> Result<SummaryMatrix, DashboardError> {
    if !observations.iter().any(|o| o.metrics.contains_key(metric)) {
        return Err(DashboardError::InvalidMetric(metric.to_string()));
    }

    // Rows without both group keys belong to no cohort.
    let cohort_rows: Vec<&Observation> = observations
        .iter()
        .filter(|o| !o.age_group.is_empty() && !o.diet_group.is_empty())
        .collect();
    let grouped = group_values(
        &cohort_rows,
        |o| (o.age_group.clone(), o.diet_group.clone()),
        |o| o.metric(metric),
    );

    let table = pivot(
        grouped
            .into_iter()
            .map(|((age, diet), values)| (age, diet, (sample_std_dev(&values), values.len()))),
    );

    let cells = table
        .cells
        .iter()
        .map(|row| row.iter().map(|c| c.and_then(|(sd, _)| sd)).collect())
        .collect();
    let cohort_sizes = table
        .cells
        .iter()
        .map(|row| row.iter().map(|c| c.map_or(0, |(_, n)| n)).collect())
        .collect();

    debug!(
        "Summarized {}: {} age groups x {} diet groups",
        metric,
        table.rows.len(),
        table.columns.len()
    );

    Ok(SummaryMatrix {
        metric: metric.to_string(),
        row_labels: table.rows,
        column_labels: table.columns,
        cells,
        cohort_sizes,
    })
}

/// Summarize every metric in `metrics` into a workbook keyed by metric name.
pub fn summarize_all(
    observations: &[Observation],
    metrics: &[Metric],
) -> Result<SummaryWorkbook, DashboardError> {
    let mut workbook = SummaryWorkbook::default();

    for metric in metrics {
        let matrix = summarize(observations, metric.as_str())?;
        workbook.tables.insert(metric.as_str().to_string(), matrix);
    }

    Ok(workbook)
}
