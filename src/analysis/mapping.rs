//! Static lookup tables connecting the reference datasets.
//!
//! `FoodCategoryMapping` resolves fine-grained food items to coarse
//! categories; `DietLabels` translates diet codes to the labels used by the
//! dietary proportion table.

use crate::error::DashboardError;
use crate::models::FoodCategory;
use std::collections::{BTreeMap, HashMap};

/// Default food items per coarse category.
pub fn default_food_categories() -> BTreeMap<String, Vec<String>> {
    let table: [(FoodCategory, &[&str]); 9] = [
        (
            FoodCategory::Grains,
            &[
                "Barley (Beer)",
                "Beet Sugar",
                "Maize (Meal)",
                "Oatmeal",
                "Rice",
                "Wheat & Rye (Bread)",
            ],
        ),
        (FoodCategory::Potatoes, &["Potatoes"]),
        (
            FoodCategory::Beans,
            &["Groundnuts", "Other Pulses", "Peas", "Soybean Oil"],
        ),
        (
            FoodCategory::Fruit,
            &[
                "Apples",
                "Bananas",
                "Berries & Grapes",
                "Citrus Fruit",
                "Other Fruit",
                "Tomatoes",
            ],
        ),
        (
            FoodCategory::Meat,
            &[
                "Bovine Meat (beef herd)",
                "Bovine Meat (dairy herd)",
                "Lamb & Mutton",
                "Pig Meat",
                "Poultry Meat",
            ],
        ),
        (
            FoodCategory::Fish,
            &["Crustaceans (farmed)", "Fish (farmed)"],
        ),
        (FoodCategory::Cheese, &["Cheese"]),
        (FoodCategory::Milk, &["Milk"]),
        (FoodCategory::Yogurt, &["Soymilk", "Tofu"]),
    ];

    table
        .iter()
        .map(|(category, items)| {
            (
                category.as_str().to_string(),
                items.iter().map(|s| s.to_string()).collect(),
            )
        })
        .collect()
}

/// Default diet code to display label translation.
pub fn default_diet_labels() -> BTreeMap<String, String> {
    [
        ("fish", "Fish-eaters"),
        ("veggie", "Vegetarians"),
        ("vegan", "Vegans"),
        ("meat", "Low meat-eaters"),
        ("meat50", "Medium meat-eaters"),
        ("meat100", "High meat-eaters"),
    ]
    .into_iter()
    .map(|(code, label)| (code.to_string(), label.to_string()))
    .collect()
}

/// Reverse index from food item to coarse category.
#[derive(Debug, Clone, PartialEq)]
pub struct FoodCategoryMapping {
    by_item: HashMap<String, FoodCategory>,
}

impl FoodCategoryMapping {
    /// Build from a category-name → food-items table.
    ///
    /// Category names must be one of the nine coarse categories, and each
    /// food item may appear under only one of them.
    pub fn from_table(table: &BTreeMap<String, Vec<String>>) -> Result<Self, DashboardError> {
        let mut by_item = HashMap::new();

        for (name, items) in table {
            let category = FoodCategory::ALL
                .iter()
                .copied()
                .find(|c| c.as_str() == name.as_str())
                .ok_or_else(|| DashboardError::UnknownFoodCategory(name.clone()))?;

            for item in items {
                if by_item.insert(item.clone(), category).is_some() {
                    return Err(DashboardError::DuplicateFoodItem(item.clone()));
                }
            }
        }

        Ok(Self { by_item })
    }

    /// Coarse category of a food item.
    pub fn category_of(&self, food_item: &str) -> Result<FoodCategory, DashboardError> {
        self.by_item
            .get(food_item)
            .copied()
            .ok_or_else(|| DashboardError::UnmappedFoodItem(food_item.to_string()))
    }

    pub fn len(&self) -> usize {
        self.by_item.len()
    }
}

impl Default for FoodCategoryMapping {
    fn default() -> Self {
        let mut by_item = HashMap::new();
        for (name, items) in default_food_categories() {
            let category = FoodCategory::ALL
                .iter()
                .find(|c| c.as_str() == name.as_str());
            if let Some(category) = category {
                for item in items {
                    by_item.insert(item, *category);
                }
            }
        }
        Self { by_item }
    }
}

/// Diet code to dietary-proportion label translation.
#[derive(Debug, Clone, PartialEq)]
pub struct DietLabels {
    labels: BTreeMap<String, String>,
}

impl DietLabels {
    pub fn new(labels: BTreeMap<String, String>) -> Self {
        Self { labels }
    }

    /// Display label for a diet code.
    pub fn label_for(&self, code: &str) -> Result<&str, DashboardError> {
        self.labels
            .get(code)
            .map(String::as_str)
            .ok_or_else(|| DashboardError::UnknownDietCode(code.to_string()))
    }
}

impl Default for DietLabels {
    fn default() -> Self {
        Self::new(default_diet_labels())
    }
}
