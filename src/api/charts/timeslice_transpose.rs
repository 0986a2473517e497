use tracing::debug;

use crate::api::chart_spec::ChartSpec;
use crate::api::{
    ChartCategory, ChartConfig, ChartOptions, ChartTypeDefinition, ConfigOptionDescriptor,
    TransposeOptions, ValidationResult,
};
use crate::core::{
    DEFAULT_TIMESLICE_COLUMN, DataType, FieldMetadata, Row, TransposeQuery, reduce_transposed,
};
use crate::error::ChartResult;

use super::{
    TIMESLICE_TRANSPOSE_CHART_ID, TimeChartLayout, check_time_field, mismatched_options,
    time_chart_spec,
};

pub(super) fn definition() -> ChartTypeDefinition {
    ChartTypeDefinition::new(
        TIMESLICE_TRANSPOSE_CHART_ID,
        "Timeslice Transpose",
        ChartCategory::Timeseries,
        transform,
    )
    .with_description("Charts pre-pivoted results: one row per timeslice, one column per series")
    .with_field_bounds(1, 2)
    .with_supported_data_types(&[DataType::Number, DataType::String])
    .requiring_time_field()
    .with_config_options(vec![
        ConfigOptionDescriptor::select(
            "chartStyle",
            "Chart Style",
            &["line", "area", "bar"],
            "line",
        ),
        ConfigOptionDescriptor::number("topN", "Top N Series", Some(0.0), Some(50.0), 10.0),
        ConfigOptionDescriptor::toggle("includeOther", "Include Other", true),
        ConfigOptionDescriptor::toggle("stacked", "Stacked", false),
        ConfigOptionDescriptor::toggle("showDataZoom", "Show Zoom", true),
    ])
    .with_validator(validate)
}

fn validate(config: &ChartConfig, metadata: &[FieldMetadata]) -> ValidationResult {
    check_time_field(time_column(config), metadata)
}

fn time_column(config: &ChartConfig) -> &str {
    config.field(0).unwrap_or(DEFAULT_TIMESLICE_COLUMN)
}

fn options(config: &ChartConfig) -> ChartResult<TransposeOptions> {
    match config.options.resolved_for(TIMESLICE_TRANSPOSE_CHART_ID)? {
        ChartOptions::TimesliceTranspose(options) => Ok(options),
        other => Err(mismatched_options(TIMESLICE_TRANSPOSE_CHART_ID, &other)),
    }
}

fn transform(
    rows: &[Row],
    config: &ChartConfig,
    _metadata: &[FieldMetadata],
) -> ChartResult<ChartSpec> {
    let time_column = time_column(config);
    let options = options(config)?;

    let mut query =
        TransposeQuery::new(time_column).with_top_n(options.top_n, options.include_other);
    if let Some(excluded) = config.field(1) {
        query = query.excluding(excluded);
    }

    let grid = reduce_transposed(rows, &query)?;
    debug!(
        rows = rows.len(),
        dropped_rows = grid.dropped_rows,
        time_points = grid.times.len(),
        series = grid.series.len(),
        "built timeslice-transpose chart"
    );

    Ok(time_chart_spec(
        format!("Series by {time_column}"),
        time_column,
        grid.series.into_iter().collect(),
        TimeChartLayout {
            style: options.chart_style,
            stacked: options.stacked,
            show_data_zoom: options.show_data_zoom,
        },
    ))
}
