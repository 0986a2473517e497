//! querychart-rs: turns tabular query results into chart specifications.
//!
//! Rows and field metadata come from an external query layer. A chart type
//! from the [`api::ChartRegistry`] validates the requested fields, reduces
//! the rows with the algorithms in [`core`] (timestamp parsing, aggregation,
//! time bucketing, category and series top-N) and emits a declarative
//! [`api::ChartSpec`] that any charting backend can draw.

pub mod api;
pub mod core;
pub mod error;
pub mod render;
pub mod telemetry;

pub use api::{ChartConfig, ChartEngine, ChartRegistry, ChartSpec};
pub use error::{ChartError, ChartResult};
