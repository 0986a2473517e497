use tracing::debug;

use crate::api::chart_spec::{
    AxisKind, AxisSpec, ChartSpec, LegendSpec, SeriesDatum, SeriesKind, SeriesSpec, TooltipTrigger,
};
use crate::api::{
    CategoryOptions, CategoryStyle, ChartCategory, ChartConfig, ChartOptions, ChartTypeDefinition,
    ConfigOptionDescriptor, ValidationResult,
};
use crate::core::{AggregationOp, CategoryQuery, DataType, FieldMetadata, Row, reduce_category};
use crate::error::ChartResult;

use super::{CATEGORY_CHART_ID, check_numeric_field, mismatched_options, required_field};

pub(super) fn definition() -> ChartTypeDefinition {
    ChartTypeDefinition::new(
        CATEGORY_CHART_ID,
        "Category Chart",
        ChartCategory::Category,
        transform,
    )
    .with_description("Groups rows by a field and shows a count or aggregated value per group")
    .with_field_bounds(1, 2)
    .with_supported_data_types(&[DataType::String, DataType::Number])
    .with_config_options(vec![
        ConfigOptionDescriptor::select(
            "chartStyle",
            "Chart Style",
            &["bar", "horizontalBar", "pie"],
            "bar",
        ),
        ConfigOptionDescriptor::select(
            "aggregation",
            "Aggregation",
            &["count", "sum", "avg", "min", "max"],
            "sum",
        ),
        ConfigOptionDescriptor::select(
            "sortOrder",
            "Sort Order",
            &["desc", "asc", "alpha"],
            "desc",
        ),
        ConfigOptionDescriptor::number("topN", "Top N", Some(0.0), Some(100.0), 20.0),
        ConfigOptionDescriptor::toggle("includeOther", "Include Other", true),
    ])
    .with_validator(validate)
}

fn validate(config: &ChartConfig, metadata: &[FieldMetadata]) -> ValidationResult {
    match config.field(1) {
        Some(value_field) => check_numeric_field(value_field, metadata),
        None => ValidationResult::ok(),
    }
}

fn options(config: &ChartConfig) -> ChartResult<CategoryOptions> {
    match config.options.resolved_for(CATEGORY_CHART_ID)? {
        ChartOptions::Category(options) => Ok(options),
        other => Err(mismatched_options(CATEGORY_CHART_ID, &other)),
    }
}

fn transform(
    rows: &[Row],
    config: &ChartConfig,
    _metadata: &[FieldMetadata],
) -> ChartResult<ChartSpec> {
    let category_field = required_field(config, 0, "category field")?;
    let value_field = config.field(1);
    let options = options(config)?;

    let aggregation = options.aggregation.unwrap_or(if value_field.is_some() {
        AggregationOp::Sum
    } else {
        AggregationOp::Count
    });
    let mut query = CategoryQuery::new(category_field)
        .with_aggregation(aggregation)
        .with_sort_order(options.sort_order)
        .with_top_n(options.top_n, options.include_other);
    if let Some(value_field) = value_field {
        query = query.with_value(value_field, aggregation);
    }

    let values = reduce_category(rows, &query);
    debug!(
        rows = rows.len(),
        categories = values.len(),
        aggregation = %aggregation,
        "built category chart"
    );

    let metric = match value_field {
        Some(field) => format!("{aggregation}({field})"),
        None => AggregationOp::Count.as_str().to_owned(),
    };
    let labels: Vec<String> = values.iter().map(|entry| entry.label.clone()).collect();
    let mut spec = ChartSpec::new(format!("{metric} by {category_field}"));

    match options.chart_style {
        CategoryStyle::Pie => {
            spec.tooltip.trigger = TooltipTrigger::Item;
            spec.legend = LegendSpec::bottom(labels);
            let data = values
                .into_iter()
                .map(|entry| SeriesDatum::Named {
                    name: entry.label,
                    value: entry.value,
                })
                .collect();
            spec.series = vec![SeriesSpec::new(metric, SeriesKind::Pie, data)];
        }
        style => {
            let data = values
                .iter()
                .map(|entry| SeriesDatum::Value(entry.value))
                .collect();
            let category_axis = AxisSpec::categories(labels).with_name(category_field);
            let value_axis = AxisSpec::new(AxisKind::Value).with_name(metric.clone());
            if style == CategoryStyle::HorizontalBar {
                spec.x_axis = Some(value_axis);
                spec.y_axis = Some(category_axis);
            } else {
                spec.x_axis = Some(category_axis);
                spec.y_axis = Some(value_axis);
            }
            spec.legend = LegendSpec::bottom(vec![metric.clone()]);
            spec.series = vec![SeriesSpec::new(metric, SeriesKind::Bar, data)];
        }
    }

    spec.fit_grid();
    Ok(spec)
}
