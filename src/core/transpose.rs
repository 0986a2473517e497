use std::cmp::Reverse;
use std::collections::BTreeMap;

use indexmap::{IndexMap, IndexSet};
use ordered_float::OrderedFloat;
use tracing::trace;

use crate::core::{OTHER_LABEL, Row, SeriesGrid, coerce_number, row_timestamp};
use crate::error::{ChartError, ChartResult};

/// Column conventionally holding the bucket time of pre-pivoted results.
pub const DEFAULT_TIMESLICE_COLUMN: &str = "_timeslice";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransposeQuery<'a> {
    pub time_column: &'a str,
    /// Column that is not a series even though it is not the time column.
    pub excluded_field: Option<&'a str>,
    /// `0` keeps every series.
    pub top_n: usize,
    pub include_other: bool,
}

impl<'a> TransposeQuery<'a> {
    #[must_use]
    pub fn new(time_column: &'a str) -> Self {
        Self {
            time_column,
            excluded_field: None,
            top_n: 0,
            include_other: false,
        }
    }

    #[must_use]
    pub fn excluding(mut self, field: &'a str) -> Self {
        self.excluded_field = Some(field);
        self
    }

    #[must_use]
    pub fn with_top_n(mut self, top_n: usize, include_other: bool) -> Self {
        self.top_n = top_n;
        self.include_other = include_other;
        self
    }
}

/// Reads one series per column from rows already pivoted by time.
///
/// Series are ranked by the sum of their column over all time rows (not by
/// row count). Rows sharing a timestamp are summed cell by cell. Fails when
/// the time column is absent from every row of a non-empty input.
pub fn reduce_transposed(rows: &[Row], query: &TransposeQuery<'_>) -> ChartResult<SeriesGrid> {
    if !rows.is_empty() && !rows.iter().any(|row| row.contains(query.time_column)) {
        return Err(ChartError::MissingColumn {
            column: query.time_column.to_owned(),
        });
    }

    let mut columns: IndexSet<&str> = IndexSet::new();
    let mut by_time: BTreeMap<i64, IndexMap<&str, f64>> = BTreeMap::new();
    let mut dropped_rows = 0;

    for row in rows {
        let Some(time) = row_timestamp(row, query.time_column) else {
            dropped_rows += 1;
            continue;
        };
        let cells = by_time.entry(time).or_default();
        for (column, value) in row.iter() {
            if column == query.time_column || Some(column) == query.excluded_field {
                continue;
            }
            columns.insert(column);
            *cells.entry(column).or_default() += coerce_number(Some(value));
        }
    }

    let mut ranked: Vec<(&str, f64)> = columns
        .iter()
        .map(|column| {
            let total: f64 = by_time.values().filter_map(|cells| cells.get(column)).sum();
            (*column, total)
        })
        .collect();
    ranked.sort_by_key(|(_, total)| Reverse(OrderedFloat(*total)));

    let selected_len = if query.top_n == 0 {
        ranked.len()
    } else {
        query.top_n.min(ranked.len())
    };
    let (selected, unselected) = ranked.split_at(selected_len);
    let times: Vec<i64> = by_time.keys().copied().collect();

    let mut series = IndexMap::with_capacity(selected.len() + 1);
    for (column, _) in selected {
        let points = by_time
            .iter()
            .map(|(time, cells)| (*time, cells.get(column).copied().unwrap_or(0.0)))
            .collect();
        series.insert((*column).to_owned(), points);
    }

    if query.include_other && !unselected.is_empty() {
        let points = by_time
            .iter()
            .map(|(time, cells)| {
                let rest: f64 = unselected
                    .iter()
                    .filter_map(|(column, _)| cells.get(column))
                    .sum();
                (*time, rest)
            })
            .collect();
        series.insert(OTHER_LABEL.to_owned(), points);
    }

    trace!(
        rows = rows.len(),
        dropped_rows,
        time_points = times.len(),
        columns = ranked.len(),
        "reduced transposed rows"
    );

    Ok(SeriesGrid {
        times,
        series,
        dropped_rows,
    })
}
