use tracing::debug;

use crate::api::chart_spec::ChartSpec;
use crate::api::{
    ChartCategory, ChartConfig, ChartOptions, ChartTypeDefinition, ConfigOptionDescriptor,
    SeriesChartOptions, ValidationResult,
};
use crate::core::{AggregationOp, DataType, FieldMetadata, Row, SeriesQuery, reduce_series};
use crate::error::ChartResult;

use super::{
    TIMESERIES_BY_SERIES_CHART_ID, TimeChartLayout, check_numeric_field, check_time_field,
    mismatched_options, required_field, time_chart_spec,
};

pub(super) fn definition() -> ChartTypeDefinition {
    ChartTypeDefinition::new(
        TIMESERIES_BY_SERIES_CHART_ID,
        "Time Series by Series",
        ChartCategory::Timeseries,
        transform,
    )
    .with_description("Splits a metric over time into one series per value of a field")
    .with_field_bounds(2, 3)
    .with_supported_data_types(&[DataType::String, DataType::Number])
    .requiring_time_field()
    .with_config_options(vec![
        ConfigOptionDescriptor::select(
            "chartStyle",
            "Chart Style",
            &["line", "area", "bar"],
            "line",
        ),
        ConfigOptionDescriptor::select(
            "aggregation",
            "Aggregation",
            &["count", "sum", "avg", "min", "max"],
            "sum",
        ),
        ConfigOptionDescriptor::number("topN", "Top N Series", Some(0.0), Some(50.0), 10.0),
        ConfigOptionDescriptor::toggle("includeOther", "Include Other", true),
        ConfigOptionDescriptor::toggle("stacked", "Stacked", false),
        ConfigOptionDescriptor::toggle("showDataZoom", "Show Zoom", true),
    ])
    .with_validator(validate)
}

fn validate(config: &ChartConfig, metadata: &[FieldMetadata]) -> ValidationResult {
    let Some(time_field) = config.field(0) else {
        return ValidationResult::invalid(
            "Time Series by Series requires a time field as the first field",
        );
    };
    let result = check_time_field(time_field, metadata);
    if !result.valid {
        return result;
    }
    match config.field(2) {
        Some(value_field) => check_numeric_field(value_field, metadata),
        None => ValidationResult::ok(),
    }
}

fn options(config: &ChartConfig) -> ChartResult<SeriesChartOptions> {
    match config.options.resolved_for(TIMESERIES_BY_SERIES_CHART_ID)? {
        ChartOptions::TimeseriesBySeries(options) => Ok(options),
        other => Err(mismatched_options(TIMESERIES_BY_SERIES_CHART_ID, &other)),
    }
}

fn transform(
    rows: &[Row],
    config: &ChartConfig,
    _metadata: &[FieldMetadata],
) -> ChartResult<ChartSpec> {
    let time_field = required_field(config, 0, "time field")?;
    let series_field = required_field(config, 1, "series field")?;
    let value_field = config.field(2);
    let options = options(config)?;

    let mut query = SeriesQuery::new(time_field, series_field)
        .with_top_n(options.top_n, options.include_other);
    let metric = match value_field {
        Some(field) => {
            let aggregation = options.aggregation.unwrap_or(AggregationOp::Sum);
            query = query.with_value(field, aggregation);
            format!("{aggregation}({field})")
        }
        None => AggregationOp::Count.as_str().to_owned(),
    };

    let grid = reduce_series(rows, &query);
    debug!(
        rows = rows.len(),
        dropped_rows = grid.dropped_rows,
        time_points = grid.times.len(),
        series = grid.series.len(),
        "built timeseries-by-series chart"
    );

    Ok(time_chart_spec(
        format!("{metric} by {series_field} over time"),
        time_field,
        grid.series.into_iter().collect(),
        TimeChartLayout {
            style: options.chart_style,
            stacked: options.stacked,
            show_data_zoom: options.show_data_zoom,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::transform;
    use crate::api::chart_spec::SeriesDatum;
    use crate::api::{ChartConfig, SeriesChartOptions};
    use crate::core::{OTHER_LABEL, Row};

    fn repeated(time: i64, host: &str, count: usize) -> Vec<Row> {
        (0..count)
            .map(|_| Row::new().with("_timeslice", time).with("host", host))
            .collect()
    }

    #[test]
    fn counts_top_series_and_other() {
        let mut rows = repeated(1000, "x", 5);
        rows.extend(repeated(1000, "y", 2));
        rows.extend(repeated(2000, "x", 3));
        rows.extend(repeated(2000, "y", 1));

        let config = ChartConfig::timeseries_by_series(
            ["_timeslice", "host"],
            SeriesChartOptions {
                top_n: 1,
                ..SeriesChartOptions::default()
            },
        );
        let spec = transform(&rows, &config, &[]).expect("series spec");

        assert_eq!(spec.title.text, "count by host over time");
        assert_eq!(spec.legend.data, vec!["x".to_owned(), OTHER_LABEL.to_owned()]);
        assert_eq!(
            spec.series[1].data,
            vec![
                SeriesDatum::TimeValue(1000, 2.0),
                SeriesDatum::TimeValue(2000, 1.0)
            ]
        );
    }

    #[test]
    fn value_field_defaults_to_sum() {
        let rows = vec![
            Row::new().with("t", 1000).with("s", "a").with("v", 2.0),
            Row::new().with("t", 1000).with("s", "a").with("v", 3.0),
            Row::new().with("t", 2000).with("s", "b").with("v", 4.0),
        ];
        let config =
            ChartConfig::timeseries_by_series(["t", "s", "v"], SeriesChartOptions::default());
        let spec = transform(&rows, &config, &[]).expect("series spec");

        assert_eq!(spec.title.text, "sum(v) by s over time");
        assert_eq!(
            spec.series[0].data,
            vec![
                SeriesDatum::TimeValue(1000, 5.0),
                SeriesDatum::TimeValue(2000, 0.0)
            ]
        );
        assert!(spec.series.iter().all(|series| series.data.len() == 2));
    }
}
