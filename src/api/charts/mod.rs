//! Built-in chart type definitions.
//!
//! Each definition is thin configuration over the reducers in [`crate::core`]:
//! field requirements, option descriptors, a validator and a transformer that
//! maps the reduced data onto a [`ChartSpec`].

mod category;
mod timeseries;
mod timeseries_by_series;
mod timeslice_transpose;

use crate::core::{DataType, FieldMetadata, find_field};
use crate::error::{ChartError, ChartResult};

use super::chart_spec::{
    AreaStyle, AxisKind, AxisSpec, ChartSpec, DataZoomKind, DataZoomSpec, LegendSpec, SeriesDatum,
    SeriesKind, SeriesSpec,
};
use super::{ChartConfig, ChartOptions, ChartTypeDefinition, TimeChartStyle, ValidationResult};

pub const CATEGORY_CHART_ID: &str = "category";
pub const TIMESERIES_CHART_ID: &str = "timeseries";
pub const TIMESERIES_BY_SERIES_CHART_ID: &str = "timeseries-by-series";
pub const TIMESLICE_TRANSPOSE_CHART_ID: &str = "timeslice-transpose";

/// Stack group shared by all stacked series of one chart.
pub const STACK_GROUP: &str = "total";

/// The four built-in chart types in registration order.
#[must_use]
pub fn builtin_chart_types() -> Vec<ChartTypeDefinition> {
    vec![
        category::definition(),
        timeseries::definition(),
        timeseries_by_series::definition(),
        timeslice_transpose::definition(),
    ]
}

/// Presentation switches shared by every time-indexed chart type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TimeChartLayout {
    pub style: TimeChartStyle,
    pub stacked: bool,
    pub show_data_zoom: bool,
}

/// Builds a time-axis chart from named `(time, value)` series.
pub(crate) fn time_chart_spec(
    title: String,
    time_field: &str,
    series: Vec<(String, Vec<(i64, f64)>)>,
    layout: TimeChartLayout,
) -> ChartSpec {
    let kind = match layout.style {
        TimeChartStyle::Line | TimeChartStyle::Area => SeriesKind::Line,
        TimeChartStyle::Bar => SeriesKind::Bar,
    };

    let mut spec = ChartSpec::new(title);
    spec.legend = LegendSpec::bottom(series.iter().map(|(name, _)| name.clone()).collect());
    spec.x_axis = Some(AxisSpec::new(AxisKind::Time).with_name(time_field));
    spec.y_axis = Some(AxisSpec::new(AxisKind::Value));
    spec.series = series
        .into_iter()
        .map(|(name, points)| {
            let data = points
                .into_iter()
                .map(|(time, value)| SeriesDatum::TimeValue(time, value))
                .collect();
            let mut entry = SeriesSpec::new(name, kind, data);
            if layout.stacked {
                entry.stack = Some(STACK_GROUP.to_owned());
            }
            if layout.style == TimeChartStyle::Area {
                entry.area_style = Some(AreaStyle::default());
            }
            entry
        })
        .collect();

    if layout.show_data_zoom {
        spec.data_zoom = Some(vec![
            DataZoomSpec {
                kind: DataZoomKind::Inside,
                start: 0.0,
                end: 100.0,
            },
            DataZoomSpec {
                kind: DataZoomKind::Slider,
                start: 0.0,
                end: 100.0,
            },
        ]);
    }

    spec.fit_grid();
    spec
}

/// Field at `index`, or an error naming its `role`.
pub(crate) fn required_field<'a>(
    config: &'a ChartConfig,
    index: usize,
    role: &str,
) -> ChartResult<&'a str> {
    config.field(index).ok_or_else(|| {
        ChartError::InvalidConfig(format!(
            "chart type `{}` needs a {role} at position {index}",
            config.chart_type_id
        ))
    })
}

pub(crate) fn mismatched_options(chart_type_id: &str, options: &ChartOptions) -> ChartError {
    ChartError::InvalidConfig(format!(
        "chart type `{chart_type_id}` cannot use options for `{}`",
        options.chart_type_id().unwrap_or("custom")
    ))
}

/// Rejects a designated time field that metadata declares as non-time.
/// Fields without metadata pass.
pub(crate) fn check_time_field(field: &str, metadata: &[FieldMetadata]) -> ValidationResult {
    match find_field(metadata, field) {
        Some(meta) if !meta.is_time_field => {
            ValidationResult::invalid(format!("Field '{field}' is not a time field"))
        }
        _ => ValidationResult::ok(),
    }
}

/// Rejects a value field that metadata declares as a string.
pub(crate) fn check_numeric_field(field: &str, metadata: &[FieldMetadata]) -> ValidationResult {
    match find_field(metadata, field) {
        Some(meta) if meta.data_type == DataType::String => {
            ValidationResult::invalid(format!("Field '{field}' must be numeric"))
        }
        _ => ValidationResult::ok(),
    }
}
