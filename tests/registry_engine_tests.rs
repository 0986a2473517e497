use querychart_rs::api::{
    ChartCategory, ChartConfig, ChartEngine, ChartOptions, ChartRegistry, ChartRequest, ChartSpec,
    ChartTypeDefinition, SeriesDatum, SeriesKind, SeriesSpec, TimeseriesOptions, ValidationResult,
};
use querychart_rs::core::{DataType, FieldMetadata, Row, coerce_number};
use querychart_rs::render::NullRenderer;
use querychart_rs::{ChartError, ChartResult};

fn histogram(
    rows: &[Row],
    config: &ChartConfig,
    _meta: &[FieldMetadata],
) -> ChartResult<ChartSpec> {
    let field = config
        .field(0)
        .ok_or_else(|| ChartError::InvalidConfig("histogram needs a field".to_owned()))?;
    let data = rows
        .iter()
        .map(|row| SeriesDatum::Value(coerce_number(row.get(field))))
        .collect();
    let mut spec = ChartSpec::new(format!("distribution of {field}"));
    spec.series = vec![SeriesSpec::new(field, SeriesKind::Bar, data)];
    Ok(spec)
}

fn numeric_only(config: &ChartConfig, metadata: &[FieldMetadata]) -> ValidationResult {
    let numeric = config.fields.iter().all(|name| {
        metadata
            .iter()
            .find(|field| &field.name == name)
            .is_none_or(|field| field.data_type != DataType::String)
    });
    if numeric {
        ValidationResult::ok()
    } else {
        ValidationResult::invalid("Histogram needs numeric fields")
    }
}

fn histogram_definition() -> ChartTypeDefinition {
    ChartTypeDefinition::new("histogram", "Histogram", ChartCategory::Statistical, histogram)
        .with_supported_data_types(&[DataType::Number])
        .with_validator(numeric_only)
}

#[test]
fn fixture_registry_starts_empty_and_accepts_custom_types() {
    let mut registry = ChartRegistry::new();
    assert!(registry.is_empty());

    registry
        .register(histogram_definition())
        .expect("register histogram");
    assert!(matches!(
        registry.register(histogram_definition()),
        Err(ChartError::DuplicateChartType(_))
    ));
    assert_eq!(registry.len(), 1);
}

#[test]
fn engine_builds_custom_chart_types_with_raw_options() {
    let mut engine = ChartEngine::with_builtin_chart_types();
    engine
        .register(histogram_definition())
        .expect("register histogram");

    let rows = vec![Row::new().with("latency", "12.5"), Row::new().with("latency", 3)];
    let config = ChartConfig::with_defaults("histogram", ["latency"]);
    assert!(matches!(config.options, ChartOptions::Custom(_)));

    let mut renderer = NullRenderer::default();
    let spec = engine
        .render(&mut renderer, &rows, &config, &[], None)
        .expect("render histogram");

    assert_eq!(spec.title.text, "distribution of latency");
    assert_eq!(renderer.last_series_count, 1);
    assert_eq!(renderer.last_point_count, 2);
}

#[test]
fn custom_validator_blocks_the_transformer() {
    let mut engine = ChartEngine::new(ChartRegistry::new());
    engine
        .register(histogram_definition())
        .expect("register histogram");
    let config = ChartConfig::with_defaults("histogram", ["host"]);
    let metadata = vec![FieldMetadata::new("host", DataType::String)];

    let err = engine
        .build_spec(&[], &config, &metadata, None)
        .expect_err("string field rejected");
    let ChartError::Validation(message) = err else {
        panic!("expected a validation error");
    };
    assert_eq!(message, "Histogram needs numeric fields");
}

#[test]
fn compatible_chart_types_follow_field_metadata() {
    let engine = ChartEngine::with_builtin_chart_types();
    let metadata = vec![
        FieldMetadata::new("status", DataType::String),
        FieldMetadata::new("bytes", DataType::Number),
    ];
    let ids: Vec<&str> = engine
        .compatible_chart_types(&metadata)
        .into_iter()
        .map(|definition| definition.id.as_str())
        .collect();

    assert_eq!(ids, vec!["category"]);
}

#[test]
fn mismatched_options_fail_validation() {
    let engine = ChartEngine::with_builtin_chart_types();
    let config = ChartConfig::new(
        "category",
        vec!["status".to_owned()],
        ChartOptions::Timeseries(TimeseriesOptions::default()),
    );
    let result = engine.validate(&config, &[]);

    assert!(!result.valid);
    assert!(result.error.is_some_and(|message| message.contains("Category Chart")));
}

#[test]
fn json_request_builds_with_overrides() {
    let request: ChartRequest = serde_json::from_str(
        r#"{
            "rows": [
                {"_timeslice": "1696723200000", "bytes": "10"},
                {"_timeslice": "1696723260000", "bytes": "5"},
                {"_timeslice": "garbage", "bytes": "99"}
            ],
            "fields": [
                {"name": "_timeslice", "dataType": "number", "isTimeField": true},
                {"name": "bytes", "dataType": "number"}
            ],
            "config": {
                "chartTypeId": "timeseries",
                "fields": ["_timeslice", "sum(bytes)"],
                "options": {"chartStyle": "bar", "showDataZoom": false}
            },
            "overrides": {"title": {"text": "Traffic"}, "legend": {"position": "right"}}
        }"#,
    )
    .expect("request json");

    let engine = ChartEngine::with_builtin_chart_types();
    let spec = engine.build_request(&request).expect("spec");

    assert_eq!(spec.title.text, "Traffic");
    assert_eq!(spec.series[0].kind, SeriesKind::Bar);
    assert_eq!(spec.series[0].data.len(), 2);
    assert!(spec.data_zoom.is_none());
    assert!(spec.legend.right.is_some());
    assert!(spec.legend.left.is_none());
}

#[test]
fn engine_never_mutates_inputs() {
    let engine = ChartEngine::with_builtin_chart_types();
    let rows = vec![Row::new().with("cat", "a").with("v", "1")];
    let metadata = vec![FieldMetadata::new("cat", DataType::String)];
    let config = ChartConfig::with_defaults("category", ["cat", "v"]);
    let (rows_before, metadata_before) = (rows.clone(), metadata.clone());

    let _ = engine
        .build_spec(&rows, &config, &metadata, None)
        .expect("spec");

    assert_eq!(rows, rows_before);
    assert_eq!(metadata, metadata_before);
}

#[test]
fn json_request_with_extreme_buckets_and_times_still_builds() {
    let request: ChartRequest = serde_json::from_str(
        r#"{
            "rows": [
                {"t": 1696723200000, "bytes": 4},
                {"t": -1e19, "bytes": 99}
            ],
            "fields": [{"name": "t", "dataType": "number", "isTimeField": true}],
            "config": {
                "chartTypeId": "timeseries",
                "fields": ["t", "bytes"],
                "options": {"bucketUnit": "year", "bucketSize": 300000000}
            }
        }"#,
    )
    .expect("request json");

    let engine = ChartEngine::with_builtin_chart_types();
    let spec = engine.build_request(&request).expect("spec");

    assert_eq!(spec.series[0].data, vec![SeriesDatum::TimeValue(0, 4.0)]);
}
