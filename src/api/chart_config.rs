use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::core::{AggregationOp, SortOrder, TimeUnit};
use crate::error::{ChartError, ChartResult};

use super::charts::{
    CATEGORY_CHART_ID, TIMESERIES_BY_SERIES_CHART_ID, TIMESERIES_CHART_ID,
    TIMESLICE_TRANSPOSE_CHART_ID,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CategoryStyle {
    #[default]
    Bar,
    HorizontalBar,
    Pie,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimeChartStyle {
    #[default]
    Line,
    Area,
    Bar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CategoryOptions {
    pub chart_style: CategoryStyle,
    /// `None` picks `count` without a value field and `sum` with one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregation: Option<AggregationOp>,
    pub sort_order: SortOrder,
    pub top_n: usize,
    pub include_other: bool,
}

impl Default for CategoryOptions {
    fn default() -> Self {
        Self {
            chart_style: CategoryStyle::Bar,
            aggregation: None,
            sort_order: SortOrder::Desc,
            top_n: 20,
            include_other: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimeseriesOptions {
    pub chart_style: TimeChartStyle,
    /// `None` (`"none"` on the wire) keeps every distinct timestamp.
    #[serde(
        serialize_with = "serialize_bucket_unit",
        deserialize_with = "deserialize_bucket_unit"
    )]
    pub bucket_unit: Option<TimeUnit>,
    pub bucket_size: u32,
    pub stacked: bool,
    pub show_data_zoom: bool,
}

impl Default for TimeseriesOptions {
    fn default() -> Self {
        Self {
            chart_style: TimeChartStyle::Line,
            bucket_unit: None,
            bucket_size: 1,
            stacked: false,
            show_data_zoom: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SeriesChartOptions {
    pub chart_style: TimeChartStyle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregation: Option<AggregationOp>,
    pub top_n: usize,
    pub include_other: bool,
    pub stacked: bool,
    pub show_data_zoom: bool,
}

impl Default for SeriesChartOptions {
    fn default() -> Self {
        Self {
            chart_style: TimeChartStyle::Line,
            aggregation: None,
            top_n: 10,
            include_other: true,
            stacked: false,
            show_data_zoom: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransposeOptions {
    pub chart_style: TimeChartStyle,
    pub top_n: usize,
    pub include_other: bool,
    pub stacked: bool,
    pub show_data_zoom: bool,
}

impl Default for TransposeOptions {
    fn default() -> Self {
        Self {
            chart_style: TimeChartStyle::Line,
            top_n: 10,
            include_other: true,
            stacked: false,
            show_data_zoom: true,
        }
    }
}

/// Typed options, one variant per built-in chart type.
///
/// `Custom` carries the untyped bag for chart types registered by the host.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartOptions {
    Category(CategoryOptions),
    Timeseries(TimeseriesOptions),
    TimeseriesBySeries(SeriesChartOptions),
    TimesliceTranspose(TransposeOptions),
    Custom(IndexMap<String, Value>),
}

impl ChartOptions {
    /// Parses a raw option bag for `chart_type_id`. Missing keys take
    /// defaults, unknown keys are ignored, mistyped values are rejected.
    pub fn from_raw(chart_type_id: &str, bag: IndexMap<String, Value>) -> ChartResult<Self> {
        fn typed<T: serde::de::DeserializeOwned>(
            chart_type_id: &str,
            bag: IndexMap<String, Value>,
        ) -> ChartResult<T> {
            let object: serde_json::Map<String, Value> = bag.into_iter().collect();
            serde_json::from_value(Value::Object(object)).map_err(|e| {
                ChartError::InvalidConfig(format!("invalid options for `{chart_type_id}`: {e}"))
            })
        }

        Ok(match chart_type_id {
            CATEGORY_CHART_ID => Self::Category(typed(chart_type_id, bag)?),
            TIMESERIES_CHART_ID => Self::Timeseries(typed(chart_type_id, bag)?),
            TIMESERIES_BY_SERIES_CHART_ID => Self::TimeseriesBySeries(typed(chart_type_id, bag)?),
            TIMESLICE_TRANSPOSE_CHART_ID => Self::TimesliceTranspose(typed(chart_type_id, bag)?),
            _ => Self::Custom(bag),
        })
    }

    /// Default options for a chart type id.
    #[must_use]
    pub fn defaults_for(chart_type_id: &str) -> Self {
        match chart_type_id {
            CATEGORY_CHART_ID => Self::Category(CategoryOptions::default()),
            TIMESERIES_CHART_ID => Self::Timeseries(TimeseriesOptions::default()),
            TIMESERIES_BY_SERIES_CHART_ID => {
                Self::TimeseriesBySeries(SeriesChartOptions::default())
            }
            TIMESLICE_TRANSPOSE_CHART_ID => {
                Self::TimesliceTranspose(TransposeOptions::default())
            }
            _ => Self::Custom(IndexMap::new()),
        }
    }

    /// Built-in chart type these options belong to; `None` for `Custom`.
    #[must_use]
    pub fn chart_type_id(&self) -> Option<&'static str> {
        match self {
            Self::Category(_) => Some(CATEGORY_CHART_ID),
            Self::Timeseries(_) => Some(TIMESERIES_CHART_ID),
            Self::TimeseriesBySeries(_) => Some(TIMESERIES_BY_SERIES_CHART_ID),
            Self::TimesliceTranspose(_) => Some(TIMESLICE_TRANSPOSE_CHART_ID),
            Self::Custom(_) => None,
        }
    }

    /// Typed options for `chart_type_id`, parsing a `Custom` bag when the id is a
    /// built-in chart type.
    pub fn resolved_for(&self, chart_type_id: &str) -> ChartResult<Self> {
        match self {
            Self::Custom(bag) => Self::from_raw(chart_type_id, bag.clone()),
            typed => Ok(typed.clone()),
        }
    }

    /// Flattens back into the raw bag shape.
    #[must_use]
    pub fn to_raw(&self) -> IndexMap<String, Value> {
        let value = match self {
            Self::Category(options) => serde_json::to_value(options),
            Self::Timeseries(options) => serde_json::to_value(options),
            Self::TimeseriesBySeries(options) => serde_json::to_value(options),
            Self::TimesliceTranspose(options) => serde_json::to_value(options),
            Self::Custom(bag) => return bag.clone(),
        };
        match value {
            Ok(Value::Object(object)) => object.into_iter().collect(),
            _ => IndexMap::new(),
        }
    }
}

/// Boundary shape of a chart request: an open option bag keyed by option id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawChartConfig {
    pub chart_type_id: String,
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(default)]
    pub options: IndexMap<String, Value>,
}

/// One chart render request: chart type, ordered fields, typed options.
///
/// Serializes through [`RawChartConfig`] so the wire shape stays an open bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawChartConfig", into = "RawChartConfig")]
pub struct ChartConfig {
    pub chart_type_id: String,
    pub fields: Vec<String>,
    pub options: ChartOptions,
}

impl ChartConfig {
    #[must_use]
    pub fn new(
        chart_type_id: impl Into<String>,
        fields: Vec<String>,
        options: ChartOptions,
    ) -> Self {
        Self {
            chart_type_id: chart_type_id.into(),
            fields,
            options,
        }
    }

    /// Config with default options for `chart_type_id`.
    #[must_use]
    pub fn with_defaults<S: Into<String>>(
        chart_type_id: &str,
        fields: impl IntoIterator<Item = S>,
    ) -> Self {
        Self::new(
            chart_type_id,
            fields.into_iter().map(Into::into).collect(),
            ChartOptions::defaults_for(chart_type_id),
        )
    }

    #[must_use]
    pub fn category<S: Into<String>>(
        fields: impl IntoIterator<Item = S>,
        options: CategoryOptions,
    ) -> Self {
        Self::new(
            CATEGORY_CHART_ID,
            fields.into_iter().map(Into::into).collect(),
            ChartOptions::Category(options),
        )
    }

    #[must_use]
    pub fn timeseries<S: Into<String>>(
        fields: impl IntoIterator<Item = S>,
        options: TimeseriesOptions,
    ) -> Self {
        Self::new(
            TIMESERIES_CHART_ID,
            fields.into_iter().map(Into::into).collect(),
            ChartOptions::Timeseries(options),
        )
    }

    #[must_use]
    pub fn timeseries_by_series<S: Into<String>>(
        fields: impl IntoIterator<Item = S>,
        options: SeriesChartOptions,
    ) -> Self {
        Self::new(
            TIMESERIES_BY_SERIES_CHART_ID,
            fields.into_iter().map(Into::into).collect(),
            ChartOptions::TimeseriesBySeries(options),
        )
    }

    #[must_use]
    pub fn timeslice_transpose<S: Into<String>>(
        fields: impl IntoIterator<Item = S>,
        options: TransposeOptions,
    ) -> Self {
        Self::new(
            TIMESLICE_TRANSPOSE_CHART_ID,
            fields.into_iter().map(Into::into).collect(),
            ChartOptions::TimesliceTranspose(options),
        )
    }

    #[must_use]
    pub fn field(&self, index: usize) -> Option<&str> {
        self.fields
            .get(index)
            .map(String::as_str)
            .filter(|name| !name.is_empty())
    }

    pub fn from_raw(raw: RawChartConfig) -> ChartResult<Self> {
        if raw.chart_type_id.is_empty() {
            return Err(ChartError::InvalidConfig(
                "chart type id must not be empty".to_owned(),
            ));
        }
        let options = ChartOptions::from_raw(&raw.chart_type_id, raw.options)?;
        Ok(Self {
            chart_type_id: raw.chart_type_id,
            fields: raw.fields,
            options,
        })
    }

    #[must_use]
    pub fn to_raw(&self) -> RawChartConfig {
        RawChartConfig {
            chart_type_id: self.chart_type_id.clone(),
            fields: self.fields.clone(),
            options: self.options.to_raw(),
        }
    }
}

impl TryFrom<RawChartConfig> for ChartConfig {
    type Error = ChartError;

    fn try_from(raw: RawChartConfig) -> ChartResult<Self> {
        Self::from_raw(raw)
    }
}

impl From<ChartConfig> for RawChartConfig {
    fn from(config: ChartConfig) -> Self {
        config.to_raw()
    }
}

fn serialize_bucket_unit<S: Serializer>(
    unit: &Option<TimeUnit>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(unit.map_or("none", TimeUnit::as_str))
}

fn deserialize_bucket_unit<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<TimeUnit>, D::Error> {
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("" | "none") => Ok(None),
        Some(name) => name
            .parse::<TimeUnit>()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;
    use serde_json::json;

    use super::{
        CategoryOptions, CategoryStyle, ChartConfig, ChartOptions, RawChartConfig,
        TimeseriesOptions,
    };
    use crate::core::{AggregationOp, SortOrder, TimeUnit};

    fn bag(value: serde_json::Value) -> IndexMap<String, serde_json::Value> {
        match value {
            serde_json::Value::Object(map) => map.into_iter().collect(),
            _ => IndexMap::new(),
        }
    }

    #[test]
    fn raw_bag_fills_defaults_and_ignores_unknown_keys() {
        let options = ChartOptions::from_raw(
            "category",
            bag(json!({ "chartStyle": "pie", "topN": 5, "colorScheme": "dark" })),
        )
        .expect("category options");

        assert_eq!(
            options,
            ChartOptions::Category(CategoryOptions {
                chart_style: CategoryStyle::Pie,
                top_n: 5,
                ..CategoryOptions::default()
            })
        );
    }

    #[test]
    fn mistyped_values_are_rejected() {
        let err = ChartOptions::from_raw("category", bag(json!({ "topN": "many" })))
            .expect_err("topN must be numeric");
        assert!(err.to_string().contains("category"));
    }

    #[test]
    fn bucket_unit_accepts_none_and_unit_names() {
        let none: TimeseriesOptions =
            serde_json::from_value(json!({ "bucketUnit": "none" })).expect("none");
        let minute: TimeseriesOptions =
            serde_json::from_value(json!({ "bucketUnit": "minute", "bucketSize": 5 }))
                .expect("minute");

        assert_eq!(none.bucket_unit, None);
        assert_eq!(minute.bucket_unit, Some(TimeUnit::Minute));
        assert_eq!(minute.bucket_size, 5);
        assert!(
            serde_json::from_value::<TimeseriesOptions>(json!({ "bucketUnit": "eon" })).is_err()
        );
    }

    #[test]
    fn unknown_chart_types_keep_the_raw_bag() {
        let raw = bag(json!({ "bins": 12 }));
        let options = ChartOptions::from_raw("histogram", raw.clone()).expect("custom");
        assert_eq!(options, ChartOptions::Custom(raw));
        assert_eq!(options.chart_type_id(), None);
    }

    #[test]
    fn config_serializes_through_raw_shape() {
        let config = ChartConfig::category(
            ["status", "bytes"],
            CategoryOptions {
                aggregation: Some(AggregationOp::Avg),
                sort_order: SortOrder::Alpha,
                ..CategoryOptions::default()
            },
        );
        let value = serde_json::to_value(&config).expect("serialize config");

        assert_eq!(value["chartTypeId"], "category");
        assert_eq!(value["fields"], json!(["status", "bytes"]));
        assert_eq!(value["options"]["aggregation"], "avg");
        assert_eq!(value["options"]["sortOrder"], "alpha");

        let restored: ChartConfig = serde_json::from_value(value).expect("deserialize config");
        assert_eq!(restored, config);
    }

    #[test]
    fn empty_chart_type_id_is_invalid() {
        let raw = RawChartConfig {
            chart_type_id: String::new(),
            fields: Vec::new(),
            options: IndexMap::new(),
        };
        assert!(ChartConfig::from_raw(raw).is_err());
    }
}
