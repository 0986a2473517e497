pub mod aggregation;
pub mod bucketing;
pub mod category;
pub mod numeric;
pub mod series;
pub mod timestamp;
pub mod transpose;
pub mod types;

pub use aggregation::{AggregationOp, COUNT_TOKEN, MetricSpec, aggregate};
pub use bucketing::{BucketSpec, TimeUnit, TimedValues, bucket};
pub use category::{
    CategoryQuery, CategoryValue, OTHER_LABEL, SortOrder, apply_top_n, reduce_category,
    sort_categories,
};
pub use numeric::{coerce_number, parse_float};
pub use series::{SeriesGrid, SeriesQuery, reduce_series};
pub use timestamp::{UNPARSEABLE_TIMESTAMP, parse_timestamp, parse_timestamp_str, row_timestamp};
pub use transpose::{DEFAULT_TIMESLICE_COLUMN, TransposeQuery, reduce_transposed};
pub use types::{DataType, EMPTY_LABEL, FieldMetadata, Row, Scalar, find_field};
