//! Proportional impact allocator.
//!
//! Turns proportioned participant counts for one age group into aggregate
//! food-category weights, applies them to the per-country water-use table and
//! joins the per-country sums onto the geographic reference list.

use super::aggregator::sum_by_key;
use super::mapping::{DietLabels, FoodCategoryMapping};
use crate::context::ReferenceData;
use crate::error::DashboardError;
use crate::models::{
    CategoryWeights, Country, CountryImpact, CountryImpactResult, DietaryProportion,
    PopulationCount, ResourceUse,
};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, warn};

/// Aggregate food-category weights for one age group.
///
/// Each cohort's dietary proportions are scaled by its participant count and
/// the results summed per category.
pub fn category_weights(
    age_group: &str,
    population: &[PopulationCount],
    proportions: &[DietaryProportion],
    labels: &DietLabels,
) -> Result<CategoryWeights, DashboardError> {
    let cohorts: Vec<&PopulationCount> = population
        .iter()
        .filter(|p| p.age_group == age_group)
        .collect();

    if cohorts.is_empty() {
        return Err(DashboardError::EmptyAgeGroup(age_group.to_string()));
    }

    let mut total = CategoryWeights::default();
    for cohort in cohorts {
        let label = labels.label_for(&cohort.diet_group)?;
        let proportion = proportions
            .iter()
            .find(|p| p.diet == label)
            .ok_or_else(|| DashboardError::MissingDietProportion(label.to_string()))?;

        total.accumulate(&proportion.weights().scaled(cohort.n_participants_proportioned));
    }

    Ok(total)
}

/// Weighted water use summed per country, before any geographic join.
pub fn country_estimates(
    weights: &CategoryWeights,
    resource_use: &[ResourceUse],
    mapping: &FoodCategoryMapping,
) -> Result<BTreeMap<String, f64>, DashboardError> {
    let scaled = resource_use
        .iter()
        .map(|entry| {
            let category = mapping.category_of(&entry.food_item)?;
            Ok((entry.country.clone(), entry.water_use_l * weights.get(category)))
        })
        .collect::<Result<Vec<(String, f64)>, DashboardError>>()?;

    Ok(sum_by_key(scaled))
}

/// Left-join estimates onto the reference countries.
///
/// Every reference country gets a row; countries without an estimate get
/// zero. Returns the joined rows and the estimate countries left unjoined.
pub fn join_countries(
    estimates: &BTreeMap<String, f64>,
    countries: &[Country],
    bubble_scale: f64,
) -> (Vec<CountryImpact>, Vec<String>) {
    let joined = countries
        .iter()
        .map(|c| {
            let value = estimates.get(&c.name).copied().unwrap_or(0.0);
            CountryImpact {
                country: c.name.clone(),
                iso_a3: c.iso_a3.clone(),
                value,
                bubble_size: value * bubble_scale,
            }
        })
        .collect();

    let known: HashSet<&str> = countries.iter().map(|c| c.name.as_str()).collect();
    let unmatched = estimates
        .keys()
        .filter(|name| !known.contains(name.as_str()))
        .cloned()
        .collect();

    (joined, unmatched)
}

/// Compute the per-country water-use estimate for one age group.
pub fn allocate(
    age_group: &str,
    ctx: &ReferenceData,
) -> Result<CountryImpactResult, DashboardError> {
    let weights = category_weights(
        age_group,
        &ctx.population,
        &ctx.proportions,
        &ctx.diet_labels,
    )?;
    debug!("Category weights for {}: {:?}", age_group, weights);

    let estimates = country_estimates(&weights, &ctx.resource_use, &ctx.food_mapping)?;
    let (countries, unmatched_countries) =
        join_countries(&estimates, &ctx.countries, ctx.choropleth.bubble_scale);

    if !unmatched_countries.is_empty() {
        warn!(
            "{} countries have estimates but no map entry: {}",
            unmatched_countries.len(),
            unmatched_countries.join(", ")
        );
    }

    Ok(CountryImpactResult {
        age_group: age_group.to_string(),
        category_weights: weights,
        estimates,
        countries,
        unmatched_countries,
    })
}
