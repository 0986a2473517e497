use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::{Row, coerce_number};

/// Token meaning "count of rows", independent of any field value.
pub const COUNT_TOKEN: &str = "__count__";

/// Reduction applied to the values collected for one group or bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "&'static str")]
pub enum AggregationOp {
    Count,
    #[default]
    Sum,
    Avg,
    Min,
    Max,
}

impl AggregationOp {
    /// Case-insensitive lookup. Unknown names fall back to [`AggregationOp::Sum`].
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "count" => Self::Count,
            "avg" | "average" | "mean" => Self::Avg,
            "min" => Self::Min,
            "max" => Self::Max,
            _ => Self::Sum,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Count => "count",
            Self::Sum => "sum",
            Self::Avg => "avg",
            Self::Min => "min",
            Self::Max => "max",
        }
    }
}

impl From<String> for AggregationOp {
    fn from(value: String) -> Self {
        Self::from_name(&value)
    }
}

impl From<AggregationOp> for &'static str {
    fn from(value: AggregationOp) -> Self {
        value.as_str()
    }
}

impl fmt::Display for AggregationOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reduces `values` under `op`. Every operator returns `0.0` on empty input.
#[must_use]
pub fn aggregate(values: &[f64], op: AggregationOp) -> f64 {
    match op {
        AggregationOp::Count => values.len() as f64,
        AggregationOp::Sum => values.iter().sum(),
        AggregationOp::Avg => {
            if values.is_empty() {
                0.0
            } else {
                values.iter().sum::<f64>() / values.len() as f64
            }
        }
        AggregationOp::Min => values.iter().copied().reduce(f64::min).unwrap_or(0.0),
        AggregationOp::Max => values.iter().copied().reduce(f64::max).unwrap_or(0.0),
    }
}

/// One output series of a multi-metric time chart, parsed from a field token.
///
/// Accepted forms: `agg(field)`, a bare `field` (summed), and [`COUNT_TOKEN`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSpec {
    /// The token as written; unique key for the series.
    pub key: String,
    /// Display name of the series.
    pub name: String,
    /// Source field. `None` counts rows.
    pub field: Option<String>,
    pub op: AggregationOp,
}

impl MetricSpec {
    #[must_use]
    pub fn parse(token: &str) -> Self {
        let token = token.trim();
        if token == COUNT_TOKEN {
            return Self {
                key: token.to_owned(),
                name: AggregationOp::Count.as_str().to_owned(),
                field: None,
                op: AggregationOp::Count,
            };
        }

        if let Some((op_name, field)) = split_call(token) {
            return Self {
                key: token.to_owned(),
                name: token.to_owned(),
                field: Some(field.to_owned()),
                op: AggregationOp::from_name(op_name),
            };
        }

        Self {
            key: token.to_owned(),
            name: token.to_owned(),
            field: Some(token.to_owned()),
            op: AggregationOp::Sum,
        }
    }

    /// Value contributed by one row: `1.0` for row counts, else the coerced cell.
    #[must_use]
    pub fn row_value(&self, row: &Row) -> f64 {
        match &self.field {
            Some(field) => coerce_number(row.get(field)),
            None => 1.0,
        }
    }
}

fn split_call(token: &str) -> Option<(&str, &str)> {
    let inner = token.strip_suffix(')')?;
    let (op_name, field) = inner.split_once('(')?;
    let field = field.trim();
    let is_identifier = !op_name.is_empty()
        && op_name
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_');
    (is_identifier && !field.is_empty()).then_some((op_name, field))
}

#[cfg(test)]
mod tests {
    use super::{AggregationOp, COUNT_TOKEN, MetricSpec, aggregate};

    #[test]
    fn empty_input_is_zero_for_every_operator() {
        for op in [
            AggregationOp::Count,
            AggregationOp::Sum,
            AggregationOp::Avg,
            AggregationOp::Min,
            AggregationOp::Max,
        ] {
            assert_eq!(aggregate(&[], op), 0.0, "{op}");
        }
    }

    #[test]
    fn reduces_values_per_operator() {
        let values = [4.0, -2.0, 10.0];
        assert_eq!(aggregate(&values, AggregationOp::Count), 3.0);
        assert_eq!(aggregate(&values, AggregationOp::Sum), 12.0);
        assert_eq!(aggregate(&values, AggregationOp::Avg), 4.0);
        assert_eq!(aggregate(&values, AggregationOp::Min), -2.0);
        assert_eq!(aggregate(&values, AggregationOp::Max), 10.0);
    }

    #[test]
    fn count_ignores_values() {
        assert_eq!(aggregate(&[0.0, 0.0], AggregationOp::Count), 2.0);
    }

    #[test]
    fn unknown_operator_names_fall_back_to_sum() {
        assert_eq!(AggregationOp::from_name("AVG"), AggregationOp::Avg);
        assert_eq!(AggregationOp::from_name("median"), AggregationOp::Sum);
        assert_eq!(AggregationOp::from_name(""), AggregationOp::Sum);

        let decoded: AggregationOp = serde_json::from_str("\"p99\"").expect("lenient op");
        assert_eq!(decoded, AggregationOp::Sum);
        assert_eq!(
            serde_json::to_string(&AggregationOp::Max).expect("serialize op"),
            "\"max\""
        );
    }

    #[test]
    fn metric_tokens_parse_operator_and_field() {
        let avg = MetricSpec::parse("avg(latency)");
        assert_eq!(avg.field.as_deref(), Some("latency"));
        assert_eq!(avg.op, AggregationOp::Avg);
        assert_eq!(avg.name, "avg(latency)");

        let bare = MetricSpec::parse("bytes");
        assert_eq!(bare.field.as_deref(), Some("bytes"));
        assert_eq!(bare.op, AggregationOp::Sum);

        let count = MetricSpec::parse(COUNT_TOKEN);
        assert_eq!(count.field, None);
        assert_eq!(count.op, AggregationOp::Count);
        assert_eq!(count.name, "count");

        let unknown = MetricSpec::parse("p95(latency)");
        assert_eq!(unknown.op, AggregationOp::Sum);
        assert_eq!(unknown.field.as_deref(), Some("latency"));
    }

    #[test]
    fn malformed_calls_are_treated_as_field_names() {
        let token = MetricSpec::parse("sum()");
        assert_eq!(token.field.as_deref(), Some("sum()"));
        assert_eq!(token.op, AggregationOp::Sum);
    }
}
