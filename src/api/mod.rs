mod chart_config;
pub mod chart_spec;
mod chart_type;
pub mod charts;
mod engine;
mod json_contract;
mod overrides;
mod registry;

pub use chart_config::{
    CategoryOptions, CategoryStyle, ChartConfig, ChartOptions, RawChartConfig, SeriesChartOptions,
    TimeChartStyle, TimeseriesOptions, TransposeOptions,
};
pub use chart_spec::{
    AxisKind, AxisSpec, ChartSpec, GridSpec, LegendOrient, LegendPosition, LegendSpec, Offset,
    SeriesDatum, SeriesKind, SeriesSpec, TitleSpec,
};
pub use chart_type::{
    ChartCategory, ChartTransformer, ChartTypeDefinition, ChartTypeSummary, ChartValidator,
    ConfigOptionDescriptor, OptionKind, ValidationResult,
};
pub use charts::{
    CATEGORY_CHART_ID, TIMESERIES_BY_SERIES_CHART_ID, TIMESERIES_CHART_ID,
    TIMESLICE_TRANSPOSE_CHART_ID, builtin_chart_types,
};
pub use engine::{ChartEngine, ChartRequest};
pub use json_contract::{
    CHART_CONFIG_JSON_SCHEMA_V1, CHART_SPEC_JSON_SCHEMA_V1, ChartConfigJsonContractV1,
    ChartSpecJsonContractV1,
};
pub use overrides::{
    AxisOverride, DisplayOverrides, GridOverride, LegendOverride, TitleOverride, apply_overrides,
};
pub use registry::ChartRegistry;
