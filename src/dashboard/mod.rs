//! Selector handling for the dashboard panels.
//!
//! Each selector control maps to one pure handler taking the reference data
//! and the selected value and returning a chart payload. There is no shared
//! mutable state: a selection is answered by calling the handler again.

pub mod charts;

use crate::analysis::allocate;
use crate::context::ReferenceData;
use crate::error::DashboardError;
use charts::{ChoroplethChart, SpiderChart, StackedBarChart};
use serde::Serialize;
use tracing::{debug, warn};

pub const SPIDER_TITLE: &str =
    "Standard Deviation of environmental metrics w.r.t. diet type and age category";
pub const STACKED_TITLE: &str = "Proportion of diet groups for each age group";
pub const CHOROPLETH_TITLE: &str = "Mean water use for production of food items in various \
     countries, based on age groups of British consumers";

/// Selector controls that drive a panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ControlId {
    /// Metric table selector driving the radar chart.
    MetricDropdown,
    /// Age group selector driving the choropleth.
    AgeGroupDropdown,
}

/// Pure selection handler.
pub type Handler = fn(&ReferenceData, &str) -> Result<ChartPayload, DashboardError>;

impl ControlId {
    /// Element id of the control.
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlId::MetricDropdown => "sheet-dropdown",
            ControlId::AgeGroupDropdown => "diet-category-dropdown",
        }
    }

    /// Element id of the figure the control updates.
    pub fn output_id(&self) -> &'static str {
        match self {
            ControlId::MetricDropdown => "spider-chart",
            ControlId::AgeGroupDropdown => "choropleth-chart",
        }
    }

    pub const ALL: [ControlId; 2] = [ControlId::MetricDropdown, ControlId::AgeGroupDropdown];

    /// Position of the control in [`ControlId::ALL`].
    fn index(&self) -> usize {
        *self as usize
    }
}

/// Figure description handed to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartPayload {
    Spider(SpiderChart),
    StackedBar(StackedBarChart),
    Choropleth(ChoroplethChart),
    /// The selection matched no data; the panel renders empty.
    NoData { message: String },
}

impl ChartPayload {
    pub fn is_no_data(&self) -> bool {
        matches!(self, ChartPayload::NoData { .. })
    }
}

/// Panel kinds on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelKind {
    Spider,
    StackedBar,
    Choropleth,
}

impl PanelKind {
    pub const ALL: [PanelKind; 3] = [
        PanelKind::Spider,
        PanelKind::StackedBar,
        PanelKind::Choropleth,
    ];
}

/// One rendered dashboard panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panel {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub control: Option<ControlId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selection: Option<String>,
    pub figure: ChartPayload,
}

fn update_spider_chart(
    ctx: &ReferenceData,
    metric: &str,
) -> Result<ChartPayload, DashboardError> {
    let matrix = ctx.workbook.table(metric)?;
    Ok(ChartPayload::Spider(charts::spider_chart(matrix)))
}

fn update_choropleth(
    ctx: &ReferenceData,
    age_group: &str,
) -> Result<ChartPayload, DashboardError> {
    let result = allocate(age_group, ctx)?;
    Ok(ChartPayload::Choropleth(charts::choropleth_chart(
        &result,
        &ctx.choropleth,
    )))
}

/// Dashboard over a fixed set of reference data.
pub struct Dashboard<'a> {
    ctx: &'a ReferenceData,
    /// One handler per control, in [`ControlId::ALL`] order.
    handlers: [(ControlId, Handler); 2],
}

impl<'a> Dashboard<'a> {
    /// Register the selection handlers over `ctx`.
    pub fn new(ctx: &'a ReferenceData) -> Self {
        Self {
            ctx,
            handlers: [
                (ControlId::MetricDropdown, update_spider_chart as Handler),
                (ControlId::AgeGroupDropdown, update_choropleth as Handler),
            ],
        }
    }

    /// Handler registered for a control.
    pub fn handler(&self, control: ControlId) -> Handler {
        self.handlers[control.index()].1
    }

    /// Answer a selection on a control.
    ///
    /// An age group with no population rows becomes a `NoData` payload; all
    /// other errors propagate.
    pub fn dispatch(
        &self,
        control: ControlId,
        value: &str,
    ) -> Result<ChartPayload, DashboardError> {
        debug!("Dispatch {} = {}", control.as_str(), value);

        match self.handler(control)(self.ctx, value) {
            Err(e) if e.is_no_data() => {
                warn!("No data for {} = {}: {}", control.as_str(), value, e);
                Ok(ChartPayload::NoData {
                    message: e.to_string(),
                })
            }
            other => other,
        }
    }

    /// Values offered by a control.
    pub fn options(&self, control: ControlId, age_groups: &[String]) -> Vec<String> {
        match control {
            ControlId::MetricDropdown => self.ctx.workbook.table_names(),
            ControlId::AgeGroupDropdown => age_groups.to_vec(),
        }
    }

    /// The static stacked proportion panel.
    pub fn stacked_bar(&self) -> ChartPayload {
        ChartPayload::StackedBar(charts::stacked_bar_chart(&self.ctx.population))
    }

    /// All three panels for the initial selection.
    pub fn initial_view(
        &self,
        metric: &str,
        age_group: &str,
    ) -> Result<Vec<Panel>, DashboardError> {
        self.panels(&PanelKind::ALL, metric, age_group)
    }

    /// Build the requested panels for a metric and age group selection.
    pub fn panels(
        &self,
        kinds: &[PanelKind],
        metric: &str,
        age_group: &str,
    ) -> Result<Vec<Panel>, DashboardError> {
        kinds
            .iter()
            .map(|kind| self.panel(*kind, metric, age_group))
            .collect()
    }

    fn panel(
        &self,
        kind: PanelKind,
        metric: &str,
        age_group: &str,
    ) -> Result<Panel, DashboardError> {
        let panel = match kind {
            PanelKind::Spider => {
                self.controlled_panel(ControlId::MetricDropdown, SPIDER_TITLE, metric)?
            }
            PanelKind::StackedBar => Panel {
                id: "stacked-bar-chart".to_string(),
                title: STACKED_TITLE.to_string(),
                control: None,
                selection: None,
                figure: self.stacked_bar(),
            },
            PanelKind::Choropleth => {
                self.controlled_panel(ControlId::AgeGroupDropdown, CHOROPLETH_TITLE, age_group)?
            }
        };
        Ok(panel)
    }

    fn controlled_panel(
        &self,
        control: ControlId,
        title: &str,
        value: &str,
    ) -> Result<Panel, DashboardError> {
        Ok(Panel {
            id: control.output_id().to_string(),
            title: title.to_string(),
            control: Some(control),
            selection: Some(value.to_string()),
            figure: self.dispatch(control, value)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::summarize_all;
    use crate::models::{
        Country, DietaryProportion, Metric, Observation, PopulationCount, ResourceUse,
    };
    use std::collections::BTreeMap;

    fn context() -> ReferenceData {
        let population = vec![
            PopulationCount {
                age_group: "20-29".to_string(),
                diet_group: "vegan".to_string(),
                n_participants_proportioned: 50.0,
            },
            PopulationCount {
                age_group: "20-29".to_string(),
                diet_group: "meat".to_string(),
                n_participants_proportioned: 100.0,
            },
        ];
        let proportion = |diet: &str, meat: f64| DietaryProportion {
            diet: diet.to_string(),
            grains: 0.3,
            potatoes: 0.1,
            beans: 0.1,
            fruit: 0.1,
            meat,
            fish: 0.0,
            cheese: 0.1,
            milk: 0.1,
            yogurt: 0.1,
        };
        let resource_use = vec![
            ResourceUse {
                food_item: "Pig Meat".to_string(),
                country: "Spain".to_string(),
                water_use_l: 20.0,
            },
            ResourceUse {
                food_item: "Oatmeal".to_string(),
                country: "Spain".to_string(),
                water_use_l: 2.0,
            },
        ];
        let countries = vec![
            Country {
                name: "Spain".to_string(),
                iso_a3: "ESP".to_string(),
            },
            Country {
                name: "Chile".to_string(),
                iso_a3: "CHL".to_string(),
            },
        ];

        let mut ctx = ReferenceData::for_tests(
            population,
            vec![proportion("Vegans", 0.0), proportion("Low meat-eaters", 0.1)],
            resource_use,
            countries,
        );

        let observations: Vec<Observation> = [("vegan", 1.0), ("vegan", 3.0), ("meat", 2.0)]
            .iter()
            .map(|(diet, v)| Observation {
                diet_group: diet.to_string(),
                age_group: "20-29".to_string(),
                metrics: Metric::ALL
                    .iter()
                    .map(|m| (m.as_str().to_string(), *v))
                    .collect::<BTreeMap<_, _>>(),
            })
            .collect();
        ctx.workbook = summarize_all(&observations, &Metric::ALL).unwrap();
        ctx
    }

    #[test]
    fn test_control_ids() {
        assert_eq!(ControlId::MetricDropdown.as_str(), "sheet-dropdown");
        assert_eq!(ControlId::AgeGroupDropdown.output_id(), "choropleth-chart");
    }

    #[test]
    fn test_handler_table_covers_every_control() {
        let ctx = context();
        let dashboard = Dashboard::new(&ctx);

        for (i, control) in ControlId::ALL.iter().enumerate() {
            assert_eq!(dashboard.handlers[i].0, *control);
        }

        let payload = dashboard.handler(ControlId::MetricDropdown)(&ctx, "mean_bio").unwrap();
        assert!(matches!(payload, ChartPayload::Spider(_)));

        let payload = dashboard.handler(ControlId::AgeGroupDropdown)(&ctx, "20-29").unwrap();
        assert!(matches!(payload, ChartPayload::Choropleth(_)));
    }

    #[test]
    fn test_dispatch_metric() {
        let ctx = context();
        let dashboard = Dashboard::new(&ctx);

        match dashboard.dispatch(ControlId::MetricDropdown, "mean_eut").unwrap() {
            ChartPayload::Spider(chart) => {
                assert_eq!(chart.metric, "mean_eut");
                assert_eq!(chart.theta, vec!["meat", "vegan", "meat"]);
                // One meat observation: undefined, not zero.
                assert_eq!(chart.series[0].r[0], None);
            }
            other => panic!("unexpected payload: {:?}", other),
        }
    }

    #[test]
    fn test_dispatch_unknown_metric_is_an_error() {
        let ctx = context();
        let dashboard = Dashboard::new(&ctx);

        assert_eq!(
            dashboard.dispatch(ControlId::MetricDropdown, "mean_acid"),
            Err(DashboardError::InvalidMetric("mean_acid".to_string()))
        );
    }

    #[test]
    fn test_dispatch_age_group() {
        let ctx = context();
        let dashboard = Dashboard::new(&ctx);

        match dashboard.dispatch(ControlId::AgeGroupDropdown, "20-29").unwrap() {
            ChartPayload::Choropleth(chart) => {
                // Meat weight 10, grains weight 45: 20 * 10 + 2 * 45.
                let spain = &chart.countries[0];
                assert!((spain.value - 290.0).abs() < 1e-9);
                assert_eq!(chart.countries[1].value, 0.0);
            }
            other => panic!("unexpected payload: {:?}", other),
        }
    }

    #[test]
    fn test_empty_age_group_renders_no_data() {
        let ctx = context();
        let dashboard = Dashboard::new(&ctx);

        let payload = dashboard.dispatch(ControlId::AgeGroupDropdown, "50-59").unwrap();
        assert!(payload.is_no_data());
    }

    #[test]
    fn test_panels_and_options() {
        let ctx = context();
        let dashboard = Dashboard::new(&ctx);

        let panels = dashboard.initial_view("mean_bio", "20-29").unwrap();
        let ids: Vec<&str> = panels.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["spider-chart", "stacked-bar-chart", "choropleth-chart"]);
        assert_eq!(panels[1].control, None);

        let json = serde_json::to_value(&panels[0]).unwrap();
        assert_eq!(json["figure"]["kind"], "spider");
        assert_eq!(json["control"], "metric-dropdown");

        let metrics = dashboard.options(ControlId::MetricDropdown, &[]);
        assert_eq!(metrics.len(), 5);
        assert_eq!(metrics[0], "mean_bio");
    }
}
