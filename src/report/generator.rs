//! Dashboard report generation.
//!
//! This module serializes the computed panels as JSON for a chart front end,
//! or as Markdown tables for reading in a terminal or a pull request.

use crate::dashboard::charts::{ChoroplethChart, SpiderChart, StackedBarChart};
use crate::dashboard::{ChartPayload, Panel};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Metadata about a dashboard run.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    /// When the panels were computed.
    pub generated_at: DateTime<Utc>,
    /// Directory the reference tables were read from.
    pub data_dir: String,
    /// Selected metric table.
    pub metric: String,
    /// Selected age group.
    pub age_group: String,
    /// Values offered by the metric selector.
    pub metric_options: Vec<String>,
    /// Values offered by the age group selector.
    pub age_group_options: Vec<String>,
}

/// The complete set of computed panels.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    pub metadata: ReportMetadata,
    pub panels: Vec<Panel>,
}

impl DashboardReport {
    /// Number of panels that rendered as "no data".
    pub fn no_data_count(&self) -> usize {
        self.panels.iter().filter(|p| p.figure.is_no_data()).count()
    }
}

/// Generate a JSON report.
pub fn generate_json_report(report: &DashboardReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &DashboardReport) -> String {
    let mut output = String::new();

    output.push_str("# Diet & Environment Dashboard\n\n");
    output.push_str(&generate_metadata_section(&report.metadata));

    for panel in &report.panels {
        output.push_str(&generate_panel_section(panel));
    }

    output.push_str("---\n\n");
    output.push_str("*Generated by dietscape*\n");

    output
}

fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Data Directory:** `{}`\n", metadata.data_dir));
    section.push_str(&format!("- **Metric:** `{}`\n", metadata.metric));
    section.push_str(&format!("- **Age Group:** {}\n", metadata.age_group));
    section.push_str(&format!(
        "- **Metric Options:** {}\n",
        metadata.metric_options.join(", ")
    ));
    section.push_str(&format!(
        "- **Age Group Options:** {}\n",
        metadata.age_group_options.join(", ")
    ));
    section.push('\n');

    section
}

fn generate_panel_section(panel: &Panel) -> String {
    let mut section = String::new();

    section.push_str(&format!("## {}\n\n", panel.title));
    if let Some(ref selection) = panel.selection {
        section.push_str(&format!("*Selection: {}*\n\n", selection));
    }

    let body = match &panel.figure {
        ChartPayload::Spider(chart) => spider_table(chart),
        ChartPayload::StackedBar(chart) => stacked_table(chart),
        ChartPayload::Choropleth(chart) => choropleth_table(chart),
        ChartPayload::NoData { message } => format!("No data: {}\n", message),
    };
    section.push_str(&body);
    section.push('\n');

    section
}

/// Format an optional value; undefined cells render as a dash.
fn cell(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.4}", v),
        None => "–".to_string(),
    }
}

fn spider_table(chart: &SpiderChart) -> String {
    let mut table = String::new();

    // The closing label is repeated at the end of theta; skip it here.
    let axes = &chart.theta[..chart.theta.len().saturating_sub(1)];

    table.push_str(&format!("| Age Group | {} |\n", axes.join(" | ")));
    table.push_str(&format!("|:---|{}\n", ":---:|".repeat(axes.len())));
    for series in &chart.series {
        let values: Vec<String> = series.r.iter().take(axes.len()).map(|v| cell(*v)).collect();
        table.push_str(&format!("| {} | {} |\n", series.name, values.join(" | ")));
    }

    table
}

fn stacked_table(chart: &StackedBarChart) -> String {
    let mut table = String::new();
    let names: Vec<&str> = chart.series.iter().map(|s| s.name.as_str()).collect();

    table.push_str(&format!("| {} | {} |\n", chart.x_label, names.join(" | ")));
    table.push_str(&format!("|:---|{}\n", ":---:|".repeat(names.len())));
    for (i, age_group) in chart.x.iter().enumerate() {
        let values: Vec<String> = chart.series.iter().map(|s| cell(s.y[i])).collect();
        table.push_str(&format!("| {} | {} |\n", age_group, values.join(" | ")));
    }

    table
}

fn choropleth_table(chart: &ChoroplethChart) -> String {
    let mut table = String::new();

    table.push_str("### Category Weights\n\n");
    table.push_str("| Category | Weight |\n");
    table.push_str("|:---|:---:|\n");
    for (category, weight) in chart.category_weights.iter() {
        table.push_str(&format!("| {} | {:.4} |\n", category, weight));
    }
    table.push('\n');

    let mut countries: Vec<_> = chart.countries.iter().filter(|c| c.value > 0.0).collect();
    countries.sort_by(|a, b| {
        b.value
            .partial_cmp(&a.value)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    table.push_str("### Water Use by Country\n\n");
    table.push_str(&format!(
        "*{} of {} countries with data; color range {:.0}–{:.0} ({})*\n\n",
        countries.len(),
        chart.countries.len(),
        chart.range_color[0],
        chart.range_color[1],
        chart.color_scale
    ));
    table.push_str("| Country | ISO | Water Use (L) |\n");
    table.push_str("|:---|:---:|---:|\n");
    for country in countries {
        table.push_str(&format!(
            "| {} | {} | {:.2} |\n",
            country.country, country.iso_a3, country.value
        ));
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChoroplethConfig;
    use crate::dashboard::charts::{choropleth_chart, spider_chart};
    use crate::dashboard::ControlId;
    use crate::models::{CategoryWeights, CountryImpact, CountryImpactResult, SummaryMatrix};
    use std::collections::BTreeMap;

    fn create_test_report() -> DashboardReport {
        let matrix = SummaryMatrix {
            metric: "mean_ghgs".to_string(),
            row_labels: vec!["20-29".to_string()],
            column_labels: vec!["meat".to_string(), "vegan".to_string()],
            cells: vec![vec![Some(1.25), None]],
            cohort_sizes: vec![vec![4, 1]],
        };
        let result = CountryImpactResult {
            age_group: "20-29".to_string(),
            category_weights: CategoryWeights::new([45.0, 0.0, 0.0, 0.0, 10.0, 0.0, 0.0, 0.0, 0.0]),
            estimates: BTreeMap::new(),
            countries: vec![
                CountryImpact {
                    country: "Spain".to_string(),
                    iso_a3: "ESP".to_string(),
                    value: 290.0,
                    bubble_size: 29000.0,
                },
                CountryImpact {
                    country: "Chile".to_string(),
                    iso_a3: "CHL".to_string(),
                    value: 0.0,
                    bubble_size: 0.0,
                },
            ],
            unmatched_countries: vec![],
        };

        DashboardReport {
            metadata: ReportMetadata {
                generated_at: Utc::now(),
                data_dir: "fixtures".to_string(),
                metric: "mean_ghgs".to_string(),
                age_group: "20-29".to_string(),
                metric_options: vec!["mean_ghgs".to_string()],
                age_group_options: vec!["20-29".to_string()],
            },
            panels: vec![
                Panel {
                    id: "spider-chart".to_string(),
                    title: "Spread".to_string(),
                    control: Some(ControlId::MetricDropdown),
                    selection: Some("mean_ghgs".to_string()),
                    figure: ChartPayload::Spider(spider_chart(&matrix)),
                },
                Panel {
                    id: "choropleth-chart".to_string(),
                    title: "Water".to_string(),
                    control: Some(ControlId::AgeGroupDropdown),
                    selection: Some("20-29".to_string()),
                    figure: ChartPayload::Choropleth(choropleth_chart(
                        &result,
                        &ChoroplethConfig::default(),
                    )),
                },
                Panel {
                    id: "choropleth-chart".to_string(),
                    title: "Water (empty)".to_string(),
                    control: Some(ControlId::AgeGroupDropdown),
                    selection: Some("70-79".to_string()),
                    figure: ChartPayload::NoData {
                        message: "no population counts for age group: 70-79".to_string(),
                    },
                },
            ],
        }
    }

    #[test]
    fn test_generate_markdown_report() {
        let report = create_test_report();
        let markdown = generate_markdown_report(&report);

        assert!(markdown.contains("# Diet & Environment Dashboard"));
        assert!(markdown.contains("## Metadata"));
        assert!(markdown.contains("| Age Group | meat | vegan |"));
        assert!(markdown.contains("| 20-29 | 1.2500 | – |"));
        assert!(markdown.contains("| Spain | ESP | 290.00 |"));
        assert!(!markdown.contains("| Chile |"));
        assert!(markdown.contains("No data: no population counts"));
    }

    #[test]
    fn test_generate_json_report() {
        let report = create_test_report();
        let json = generate_json_report(&report).unwrap();

        assert!(json.contains("\"generated_at\""));
        assert!(json.contains("\"kind\": \"spider\""));
        assert!(json.contains("\"kind\": \"no_data\""));
        assert!(json.contains("\"range_color\""));
    }

    #[test]
    fn test_no_data_count() {
        assert_eq!(create_test_report().no_data_count(), 1);
    }
}
