use thiserror::Error;

pub type ChartResult<T> = Result<T, ChartError>;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("unknown chart type `{0}`")]
    UnknownChartType(String),

    #[error("chart type `{0}` is already registered")]
    DuplicateChartType(String),

    #[error("chart configuration rejected: {0}")]
    Validation(String),

    #[error("column `{column}` is missing from every row")]
    MissingColumn { column: String },

    #[error("invalid chart configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid data: {0}")]
    InvalidData(String),
}
