use std::cmp::Reverse;

use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::core::{AggregationOp, Row, aggregate, coerce_number};

/// Label of the synthetic entry collecting everything past the top N.
pub const OTHER_LABEL: &str = "Other";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Desc,
    Asc,
    Alpha,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryValue {
    pub label: String,
    pub value: f64,
}

impl CategoryValue {
    #[must_use]
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// Grouping request for [`reduce_category`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryQuery<'a> {
    pub category_field: &'a str,
    /// `None` switches to count mode: every row contributes `1.0`.
    pub value_field: Option<&'a str>,
    pub aggregation: AggregationOp,
    pub sort_order: SortOrder,
    /// `0` disables truncation.
    pub top_n: usize,
    pub include_other: bool,
}

impl<'a> CategoryQuery<'a> {
    #[must_use]
    pub fn new(category_field: &'a str) -> Self {
        Self {
            category_field,
            value_field: None,
            aggregation: AggregationOp::Count,
            sort_order: SortOrder::Desc,
            top_n: 0,
            include_other: false,
        }
    }

    #[must_use]
    pub fn with_value(mut self, value_field: &'a str, aggregation: AggregationOp) -> Self {
        self.value_field = Some(value_field);
        self.aggregation = aggregation;
        self
    }

    #[must_use]
    pub fn with_aggregation(mut self, aggregation: AggregationOp) -> Self {
        self.aggregation = aggregation;
        self
    }

    #[must_use]
    pub fn with_sort_order(mut self, sort_order: SortOrder) -> Self {
        self.sort_order = sort_order;
        self
    }

    #[must_use]
    pub fn with_top_n(mut self, top_n: usize, include_other: bool) -> Self {
        self.top_n = top_n;
        self.include_other = include_other;
        self
    }
}

/// Groups rows by category label and reduces each group.
///
/// Groups keep discovery order until sorted; sorting is stable, so ties keep
/// that order. With truncation active, the `Other` entry (if requested) is
/// always last and holds the plain sum of the dropped groups.
#[must_use]
pub fn reduce_category(rows: &[Row], query: &CategoryQuery<'_>) -> Vec<CategoryValue> {
    let mut groups: IndexMap<String, Vec<f64>> = IndexMap::new();
    for row in rows {
        let value = match query.value_field {
            Some(field) => coerce_number(row.get(field)),
            None => 1.0,
        };
        groups
            .entry(row.label(query.category_field))
            .or_default()
            .push(value);
    }

    let mut values: Vec<CategoryValue> = groups
        .into_iter()
        .map(|(label, samples)| CategoryValue {
            value: aggregate(&samples, query.aggregation),
            label,
        })
        .collect();

    sort_categories(&mut values, query.sort_order);
    apply_top_n(values, query.top_n, query.include_other)
}

/// Stable sort; re-sorting an already sorted slice leaves it unchanged.
pub fn sort_categories(values: &mut [CategoryValue], order: SortOrder) {
    match order {
        SortOrder::Desc => values.sort_by_key(|entry| Reverse(OrderedFloat(entry.value))),
        SortOrder::Asc => values.sort_by_key(|entry| OrderedFloat(entry.value)),
        SortOrder::Alpha => values.sort_by(|a, b| a.label.cmp(&b.label)),
    }
}

/// Keeps the first `top_n` entries, optionally appending an [`OTHER_LABEL`]
/// entry with the sum of the rest.
#[must_use]
pub fn apply_top_n(
    mut values: Vec<CategoryValue>,
    top_n: usize,
    include_other: bool,
) -> Vec<CategoryValue> {
    if top_n == 0 || values.len() <= top_n {
        return values;
    }
    let rest = values.split_off(top_n);
    if include_other {
        let other: f64 = rest.iter().map(|entry| entry.value).sum();
        values.push(CategoryValue::new(OTHER_LABEL, other));
    }
    values
}
