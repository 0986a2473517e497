use indexmap::IndexMap;
use tracing::debug;

use crate::api::chart_spec::ChartSpec;
use crate::api::{
    ChartCategory, ChartConfig, ChartOptions, ChartTypeDefinition, ConfigOptionDescriptor,
    TimeseriesOptions, ValidationResult,
};
use crate::core::{
    AggregationOp, BucketSpec, DataType, FieldMetadata, MetricSpec, Row, TimeUnit, TimedValues,
    bucket, row_timestamp,
};
use crate::error::{ChartError, ChartResult};

use super::{
    TIMESERIES_CHART_ID, TimeChartLayout, check_numeric_field, check_time_field, mismatched_options,
    required_field, time_chart_spec,
};

pub(super) fn definition() -> ChartTypeDefinition {
    let mut bucket_units = vec!["none"];
    bucket_units.extend(TimeUnit::ALL.iter().map(|unit| unit.as_str()));

    ChartTypeDefinition::new(
        TIMESERIES_CHART_ID,
        "Time Series",
        ChartCategory::Timeseries,
        transform,
    )
    .with_description("Plots one or more aggregated metrics over time")
    .with_field_bounds(2, 10)
    .with_supported_data_types(&[DataType::Number])
    .requiring_time_field()
    .with_config_options(vec![
        ConfigOptionDescriptor::select(
            "chartStyle",
            "Chart Style",
            &["line", "area", "bar"],
            "line",
        ),
        ConfigOptionDescriptor::select("bucketUnit", "Bucket Unit", &bucket_units, "none"),
        ConfigOptionDescriptor::number("bucketSize", "Bucket Size", Some(1.0), None, 1.0),
        ConfigOptionDescriptor::toggle("stacked", "Stacked", false),
        ConfigOptionDescriptor::toggle("showDataZoom", "Show Zoom", true),
    ])
    .with_validator(validate)
}

fn validate(config: &ChartConfig, metadata: &[FieldMetadata]) -> ValidationResult {
    let Some(time_field) = config.field(0) else {
        return ValidationResult::invalid("Time Series requires a time field as the first field");
    };
    let result = check_time_field(time_field, metadata);
    if !result.valid {
        return result;
    }
    for metric in metrics(config) {
        if metric.op == AggregationOp::Count {
            continue;
        }
        if let Some(field) = &metric.field {
            let result = check_numeric_field(field, metadata);
            if !result.valid {
                return result;
            }
        }
    }
    ValidationResult::ok()
}

fn options(config: &ChartConfig) -> ChartResult<TimeseriesOptions> {
    match config.options.resolved_for(TIMESERIES_CHART_ID)? {
        ChartOptions::Timeseries(options) => Ok(options),
        other => Err(mismatched_options(TIMESERIES_CHART_ID, &other)),
    }
}

/// Metrics named by every field after the time field, keyed by token.
fn metrics(config: &ChartConfig) -> Vec<MetricSpec> {
    let mut unique: IndexMap<String, MetricSpec> = IndexMap::new();
    for token in config.fields.iter().skip(1).filter(|token| !token.trim().is_empty()) {
        let metric = MetricSpec::parse(token);
        unique.entry(metric.key.clone()).or_insert(metric);
    }
    unique.into_values().collect()
}

fn transform(
    rows: &[Row],
    config: &ChartConfig,
    _metadata: &[FieldMetadata],
) -> ChartResult<ChartSpec> {
    let time_field = required_field(config, 0, "time field")?;
    let options = options(config)?;
    let metrics = metrics(config);
    if metrics.is_empty() {
        return Err(ChartError::InvalidConfig(
            "Time Series needs at least one metric field".to_owned(),
        ));
    }

    let spec = options
        .bucket_unit
        .map_or_else(BucketSpec::exact, |unit| BucketSpec::new(unit, options.bucket_size));

    let mut dropped_rows = 0usize;
    let samples: Vec<TimedValues> = rows
        .iter()
        .filter_map(|row| {
            let Some(time) = row_timestamp(row, time_field)
                .filter(|time| spec.bucket_start(*time).is_some())
            else {
                dropped_rows += 1;
                return None;
            };
            Some(metrics.iter().fold(TimedValues::new(time), |sample, metric| {
                sample.with(metric.key.clone(), metric.row_value(row))
            }))
        })
        .collect();

    let aggregations: IndexMap<String, AggregationOp> = metrics
        .iter()
        .map(|metric| (metric.key.clone(), metric.op))
        .collect();
    let buckets = bucket(&samples, spec, &aggregations);

    debug!(
        rows = rows.len(),
        dropped_rows,
        buckets = buckets.len(),
        metrics = metrics.len(),
        bucket_ms = spec.width_ms(),
        "built timeseries chart"
    );

    let names: Vec<&str> = metrics.iter().map(|metric| metric.name.as_str()).collect();
    let title = format!("{} over time", names.join(", "));
    let series = metrics
        .iter()
        .map(|metric| {
            let points = buckets
                .iter()
                .map(|entry| {
                    let value = entry.values.get(&metric.key).copied().unwrap_or(0.0);
                    (entry.time, value)
                })
                .collect();
            (metric.name.clone(), points)
        })
        .collect();

    Ok(time_chart_spec(
        title,
        time_field,
        series,
        TimeChartLayout {
            style: options.chart_style,
            stacked: options.stacked,
            show_data_zoom: options.show_data_zoom,
        },
    ))
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::{definition, transform};
    use crate::api::chart_spec::{AxisKind, SeriesDatum, SeriesKind};
    use crate::api::{ChartConfig, TimeChartStyle, TimeseriesOptions};
    use crate::core::{DataType, FieldMetadata, Row, TimeUnit};

    fn rows() -> Vec<Row> {
        vec![
            Row::new().with("t", 60_000).with("bytes", 1.0),
            Row::new().with("t", 90_000).with("bytes", 1.0),
            Row::new().with("t", 120_000).with("bytes", 1.0),
            Row::new().with("t", "nope").with("bytes", 9.0),
        ]
    }

    fn minute_buckets() -> TimeseriesOptions {
        TimeseriesOptions {
            bucket_unit: Some(TimeUnit::Minute),
            ..TimeseriesOptions::default()
        }
    }

    #[test]
    fn buckets_by_minute_and_drops_unparseable_rows() {
        let config = ChartConfig::timeseries(["t", "bytes"], minute_buckets());
        let spec = transform(&rows(), &config, &[]).expect("timeseries spec");

        assert_eq!(spec.x_axis.map(|axis| axis.kind), Some(AxisKind::Time));
        assert_eq!(spec.series.len(), 1);
        assert_eq!(
            spec.series[0].data,
            vec![
                SeriesDatum::TimeValue(60_000, 2.0),
                SeriesDatum::TimeValue(120_000, 1.0)
            ]
        );
    }

    #[test]
    fn zero_timestamps_are_dropped_as_unparseable() {
        let mut rows = rows();
        rows.push(Row::new().with("t", 0).with("bytes", 50.0));
        let config = ChartConfig::timeseries(["t", "bytes"], minute_buckets());
        let spec = transform(&rows, &config, &[]).expect("timeseries spec");

        let times: Vec<i64> = spec.series[0]
            .data
            .iter()
            .filter_map(|datum| match datum {
                SeriesDatum::TimeValue(time, _) => Some(*time),
                _ => None,
            })
            .collect();
        assert_eq!(times, vec![60_000, 120_000]);
    }

    #[test]
    fn oversized_buckets_collapse_into_one() {
        let config = ChartConfig::timeseries(
            ["t", "bytes"],
            TimeseriesOptions {
                bucket_unit: Some(TimeUnit::Year),
                bucket_size: 300_000_000,
                ..TimeseriesOptions::default()
            },
        );
        let spec = transform(&rows(), &config, &[]).expect("timeseries spec");

        assert_eq!(spec.series[0].data, vec![SeriesDatum::TimeValue(0, 3.0)]);
    }

    #[test]
    fn extreme_numeric_times_degrade_instead_of_failing() {
        let mut rows = rows();
        rows.push(Row::new().with("t", -1e19).with("bytes", 7.0));
        let config = ChartConfig::timeseries(
            ["t", "bytes"],
            TimeseriesOptions {
                bucket_unit: Some(TimeUnit::Second),
                ..TimeseriesOptions::default()
            },
        );
        let spec = transform(&rows, &config, &[]).expect("timeseries spec");

        assert_eq!(spec.series[0].data.len(), 3);
        assert!(spec.series[0].data.iter().all(|datum| datum.value() == 1.0));
    }

    #[test]
    fn metrics_keep_their_own_aggregation() {
        let config = ChartConfig::timeseries(
            ["t", "avg(bytes)", "__count__", "avg(bytes)"],
            minute_buckets(),
        );
        let spec = transform(&rows(), &config, &[]).expect("timeseries spec");

        let names: Vec<&str> = spec.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["avg(bytes)", "count"]);
        assert_relative_eq!(spec.series[0].data[0].value(), 1.0);
        assert_relative_eq!(spec.series[1].data[0].value(), 2.0);
        assert_eq!(spec.title.text, "avg(bytes), count over time");
    }

    #[test]
    fn area_style_stacking_and_zoom() {
        let config = ChartConfig::timeseries(
            ["t", "bytes"],
            TimeseriesOptions {
                chart_style: TimeChartStyle::Area,
                stacked: true,
                ..TimeseriesOptions::default()
            },
        );
        let spec = transform(&rows(), &config, &[]).expect("timeseries spec");

        assert_eq!(spec.series[0].kind, SeriesKind::Line);
        assert_eq!(spec.series[0].stack.as_deref(), Some("total"));
        assert!(spec.series[0].area_style.is_some());
        assert!(spec.has_slider());
        assert_eq!(spec.series[0].data.len(), 3);
    }

    #[test]
    fn validator_checks_time_and_numeric_fields() {
        let definition = definition();
        let metadata = vec![
            FieldMetadata::time("t"),
            FieldMetadata::new("host", DataType::String),
            FieldMetadata::new("bytes", DataType::Number),
        ];

        let bad_time = ChartConfig::timeseries(["bytes", "t"], TimeseriesOptions::default());
        assert_eq!(
            definition.validate(&bad_time, &metadata).error.as_deref(),
            Some("Field 'bytes' is not a time field")
        );

        let bad_metric = ChartConfig::timeseries(["t", "sum(host)"], TimeseriesOptions::default());
        assert_eq!(
            definition.validate(&bad_metric, &metadata).error.as_deref(),
            Some("Field 'host' must be numeric")
        );

        let counted = ChartConfig::timeseries(["t", "count(host)"], TimeseriesOptions::default());
        assert!(definition.validate(&counted, &metadata).valid);
    }
}
