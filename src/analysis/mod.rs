//! Aggregation pipeline.
//!
//! The summarizer builds the per-metric standard deviation tables; the
//! allocator turns population counts into per-country water-use estimates.

pub mod aggregator;
pub mod allocator;
pub mod mapping;
pub mod summarizer;

pub use aggregator::*;
pub use allocator::allocate;
pub use mapping::{DietLabels, FoodCategoryMapping};
pub use summarizer::{summarize, summarize_all};
