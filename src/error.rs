//! Data-integrity errors raised by the aggregation pipeline.
//!
//! These are lookup failures on malformed or mismatched reference data.
//! None of them are transient, so callers surface them instead of retrying.

use thiserror::Error;

/// Errors produced while summarizing metrics or allocating impacts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DashboardError {
    #[error("invalid metric: {0}")]
    InvalidMetric(String),

    #[error("unknown diet code: {0}")]
    UnknownDietCode(String),

    #[error("no dietary proportions for diet label: {0}")]
    MissingDietProportion(String),

    #[error("food item has no coarse category: {0}")]
    UnmappedFoodItem(String),

    #[error("no population counts for age group: {0}")]
    EmptyAgeGroup(String),

    #[error("unknown food category: {0}")]
    UnknownFoodCategory(String),

    #[error("food item mapped to more than one category: {0}")]
    DuplicateFoodItem(String),
}

impl DashboardError {
    /// True for the "no data" condition the dashboard renders as an empty panel.
    pub fn is_no_data(&self) -> bool {
        matches!(self, DashboardError::EmptyAgeGroup(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = DashboardError::UnmappedFoodItem("Coffee".to_string());
        assert_eq!(err.to_string(), "food item has no coarse category: Coffee");

        let err = DashboardError::EmptyAgeGroup("80-89".to_string());
        assert!(err.to_string().contains("80-89"));
    }

    #[test]
    fn test_is_no_data() {
        assert!(DashboardError::EmptyAgeGroup("20-29".to_string()).is_no_data());
        assert!(!DashboardError::InvalidMetric("mean_x".to_string()).is_no_data());
    }
}
