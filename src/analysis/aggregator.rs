//! Grouping, pivoting and summary statistics.
//!
//! This module provides the table-reshaping utilities shared by the
//! metric summarizer, the impact allocator and the chart builders.

use std::collections::{BTreeMap, BTreeSet};

/// Sample standard deviation (divides by n - 1).
///
/// Returns `None` for fewer than two values.
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }

    let mean = values.iter().sum::<f64>() / n as f64;
    let squared: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();

    Some((squared / (n - 1) as f64).sqrt())
}

/// Group values by a key, keeping insertion order within each group.
pub fn group_values<T, K, F, V>(items: &[T], key: F, value: V) -> BTreeMap<K, Vec<f64>>
where
    K: Ord,
    F: Fn(&T) -> K,
    V: Fn(&T) -> Option<f64>,
{
    let mut grouped: BTreeMap<K, Vec<f64>> = BTreeMap::new();

    for item in items {
        let values = grouped.entry(key(item)).or_default();
        if let Some(v) = value(item) {
            values.push(v);
        }
    }

    grouped
}

/// Sum values per key.
pub fn sum_by_key<K, I>(entries: I) -> BTreeMap<K, f64>
where
    K: Ord,
    I: IntoIterator<Item = (K, f64)>,
{
    let mut sums: BTreeMap<K, f64> = BTreeMap::new();

    for (key, value) in entries {
        *sums.entry(key).or_insert(0.0) += value;
    }

    sums
}

/// A long table reshaped into rows by columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Pivot<V> {
    /// Sorted distinct row keys.
    pub rows: Vec<String>,
    /// Sorted distinct column keys.
    pub columns: Vec<String>,
    /// `None` where no entry exists for the pair.
    pub cells: Vec<Vec<Option<V>>>,
}

/// Pivot `(row, column, value)` entries into a matrix.
///
/// Later entries for the same pair replace earlier ones.
pub fn pivot<V, I>(entries: I) -> Pivot<V>
where
    V: Clone,
    I: IntoIterator<Item = (String, String, V)>,
{
    let entries: Vec<(String, String, V)> = entries.into_iter().collect();

    let rows: Vec<String> = entries
        .iter()
        .map(|(r, _, _)| r.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let columns: Vec<String> = entries
        .iter()
        .map(|(_, c, _)| c.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut cells: Vec<Vec<Option<V>>> = vec![vec![None; columns.len()]; rows.len()];
    for (row, column, value) in entries {
        // Both keys come from the sets built above.
        if let (Ok(r), Ok(c)) = (rows.binary_search(&row), columns.binary_search(&column)) {
            cells[r][c] = Some(value);
        }
    }

    Pivot {
        rows,
        columns,
        cells,
    }
}
