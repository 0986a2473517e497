use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};

use indexmap::IndexMap;
use tracing::trace;

use crate::core::{AggregationOp, OTHER_LABEL, Row, aggregate, coerce_number, row_timestamp};

/// Cross-tabulation request for [`reduce_series`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesQuery<'a> {
    pub time_field: &'a str,
    pub series_field: &'a str,
    /// `None` switches to count mode.
    pub value_field: Option<&'a str>,
    pub aggregation: AggregationOp,
    /// `0` keeps every series.
    pub top_n: usize,
    pub include_other: bool,
}

impl<'a> SeriesQuery<'a> {
    #[must_use]
    pub fn new(time_field: &'a str, series_field: &'a str) -> Self {
        Self {
            time_field,
            series_field,
            value_field: None,
            aggregation: AggregationOp::Count,
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
    pub fn with_top_n(mut self, top_n: usize, include_other: bool) -> Self {
        self.top_n = top_n;
        self.include_other = include_other;
        self
    }

    fn effective_op(&self) -> AggregationOp {
        if self.value_field.is_some() {
            self.aggregation
        } else {
            AggregationOp::Count
        }
    }
}

/// Dense time × series grid.
///
/// Every series holds exactly one `(time, value)` pair per entry of `times`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SeriesGrid {
    /// Distinct occupied timestamps, ascending.
    pub times: Vec<i64>,
    pub series: IndexMap<String, Vec<(i64, f64)>>,
    /// Rows left out because their time cell was absent or unparseable.
    pub dropped_rows: usize,
}

impl SeriesGrid {
    #[must_use]
    pub fn series_names(&self) -> Vec<String> {
        self.series.keys().cloned().collect()
    }
}

/// Partitions rows by (time, series label) and aggregates each cell.
///
/// "Top" series are ranked by row count, not by aggregated value; ties keep
/// discovery order. The optional `Other` series aggregates the pooled values
/// of all unselected series per time point with the same operator.
#[must_use]
pub fn reduce_series(rows: &[Row], query: &SeriesQuery<'_>) -> SeriesGrid {
    let op = query.effective_op();
    let mut cells: IndexMap<String, BTreeMap<i64, Vec<f64>>> = IndexMap::new();
    let mut times = BTreeSet::new();
    let mut dropped_rows = 0;

    for row in rows {
        let Some(time) = row_timestamp(row, query.time_field) else {
            dropped_rows += 1;
            continue;
        };
        let value = match query.value_field {
            Some(field) => coerce_number(row.get(field)),
            None => 1.0,
        };
        times.insert(time);
        cells
            .entry(row.label(query.series_field))
            .or_default()
            .entry(time)
            .or_default()
            .push(value);
    }

    let mut ranked: Vec<(String, usize)> = cells
        .iter()
        .map(|(label, by_time)| (label.clone(), by_time.values().map(Vec::len).sum()))
        .collect();
    ranked.sort_by_key(|(_, row_count)| Reverse(*row_count));

    let selected_len = if query.top_n == 0 {
        ranked.len()
    } else {
        query.top_n.min(ranked.len())
    };
    let (selected, unselected) = ranked.split_at(selected_len);
    let times: Vec<i64> = times.into_iter().collect();

    let mut series = IndexMap::with_capacity(selected.len() + 1);
    for (label, _) in selected {
        let by_time = &cells[label.as_str()];
        let points = times
            .iter()
            .map(|time| {
                let value = by_time
                    .get(time)
                    .map_or(0.0, |samples| aggregate(samples, op));
                (*time, value)
            })
            .collect();
        series.insert(label.clone(), points);
    }

    if query.include_other && !unselected.is_empty() {
        let points = times
            .iter()
            .map(|time| {
                let pooled: Vec<f64> = unselected
                    .iter()
                    .filter_map(|(label, _)| cells[label.as_str()].get(time))
                    .flatten()
                    .copied()
                    .collect();
                (*time, aggregate(&pooled, op))
            })
            .collect();
        series.insert(OTHER_LABEL.to_owned(), points);
    }

    trace!(
        rows = rows.len(),
        dropped_rows,
        time_points = times.len(),
        series_total = ranked.len(),
        series_selected = series.len(),
        "reduced series grid"
    );

    SeriesGrid {
        times,
        series,
        dropped_rows,
    }
}
