use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::{AggregationOp, aggregate};
use crate::error::{ChartError, ChartResult};

const DAY_MS: i64 = 86_400_000;

/// Calendar-approximate bucket unit. Months are 30 days, years 365 days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Millisecond,
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl TimeUnit {
    pub const ALL: [TimeUnit; 8] = [
        Self::Millisecond,
        Self::Second,
        Self::Minute,
        Self::Hour,
        Self::Day,
        Self::Week,
        Self::Month,
        Self::Year,
    ];

    #[must_use]
    pub const fn millis(self) -> i64 {
        match self {
            Self::Millisecond => 1,
            Self::Second => 1_000,
            Self::Minute => 60_000,
            Self::Hour => 3_600_000,
            Self::Day => DAY_MS,
            Self::Week => 7 * DAY_MS,
            Self::Month => 30 * DAY_MS,
            Self::Year => 365 * DAY_MS,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Millisecond => "millisecond",
            Self::Second => "second",
            Self::Minute => "minute",
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeUnit {
    type Err = ChartError;

    fn from_str(value: &str) -> ChartResult<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|unit| unit.as_str() == normalized)
            .ok_or_else(|| ChartError::InvalidConfig(format!("unknown time unit `{value}`")))
    }
}

/// Fixed bucket width: `size` multiples of `unit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketSpec {
    pub unit: TimeUnit,
    pub size: u32,
}

impl BucketSpec {
    #[must_use]
    pub fn new(unit: TimeUnit, size: u32) -> Self {
        Self { unit, size }
    }

    /// One bucket per distinct millisecond, i.e. no regrouping.
    #[must_use]
    pub fn exact() -> Self {
        Self::new(TimeUnit::Millisecond, 1)
    }

    /// Bucket width in milliseconds. A zero size is treated as one; widths
    /// past `i64::MAX` saturate.
    #[must_use]
    pub fn width_ms(self) -> i64 {
        self.unit.millis().saturating_mul(i64::from(self.size.max(1)))
    }

    /// Start of the bucket containing `time`. Boundaries belong to the bucket
    /// they start. `None` when that start is not representable.
    #[must_use]
    pub fn bucket_start(self, time: i64) -> Option<i64> {
        let width = self.width_ms();
        time.div_euclid(width).checked_mul(width)
    }
}

/// Per-field numeric samples observed at one instant.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TimedValues {
    pub time: i64,
    pub values: IndexMap<String, f64>,
}

impl TimedValues {
    #[must_use]
    pub fn new(time: i64) -> Self {
        Self {
            time,
            values: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: f64) -> Self {
        self.values.insert(field.into(), value);
        self
    }
}

/// Groups samples into fixed-width buckets, ascending by bucket start.
///
/// Each field is reduced with its own operator from `aggregations`; fields
/// without an entry are summed. Every bucket carries every field in
/// `aggregations`, so series built from the output share one time axis.
/// Samples whose bucket start is not representable are skipped.
#[must_use]
pub fn bucket(
    samples: &[TimedValues],
    spec: BucketSpec,
    aggregations: &IndexMap<String, AggregationOp>,
) -> Vec<TimedValues> {
    let mut buckets: BTreeMap<i64, IndexMap<&str, Vec<f64>>> = BTreeMap::new();
    for sample in samples {
        let Some(start) = spec.bucket_start(sample.time) else {
            continue;
        };
        let collected = buckets.entry(start).or_default();
        for (field, value) in &sample.values {
            collected.entry(field.as_str()).or_default().push(*value);
        }
    }

    buckets
        .into_iter()
        .map(|(time, mut collected)| {
            let mut values = IndexMap::with_capacity(aggregations.len().max(collected.len()));
            for (field, op) in aggregations {
                let field_values = collected.shift_remove(field.as_str()).unwrap_or_default();
                values.insert(field.clone(), aggregate(&field_values, *op));
            }
            for (field, field_values) in collected {
                values.insert(field.to_owned(), aggregate(&field_values, AggregationOp::Sum));
            }
            TimedValues { time, values }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;

    use super::{BucketSpec, TimeUnit, TimedValues, bucket};
    use crate::core::AggregationOp;

    fn ops(entries: &[(&str, AggregationOp)]) -> IndexMap<String, AggregationOp> {
        entries
            .iter()
            .map(|(field, op)| ((*field).to_owned(), *op))
            .collect()
    }

    #[test]
    fn unit_widths_match_table() {
        assert_eq!(TimeUnit::Minute.millis(), 60_000);
        assert_eq!(TimeUnit::Week.millis(), 604_800_000);
        assert_eq!(TimeUnit::Month.millis(), 2_592_000_000);
        assert_eq!(TimeUnit::Year.millis(), 31_536_000_000);
        assert_eq!(BucketSpec::new(TimeUnit::Second, 15).width_ms(), 15_000);
        assert_eq!(BucketSpec::new(TimeUnit::Second, 0).width_ms(), 1_000);
    }

    #[test]
    fn minute_buckets_sum_per_bucket() {
        let samples = vec![
            TimedValues::new(0).with("v", 1.0),
            TimedValues::new(30_000).with("v", 1.0),
            TimedValues::new(60_000).with("v", 1.0),
        ];
        let out = bucket(
            &samples,
            BucketSpec::new(TimeUnit::Minute, 1),
            &ops(&[("v", AggregationOp::Sum)]),
        );

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].time, 0);
        assert_eq!(out[0].values["v"], 2.0);
        assert_eq!(out[1].time, 60_000);
        assert_eq!(out[1].values["v"], 1.0);
    }

    #[test]
    fn fields_use_independent_operators() {
        let samples = vec![
            TimedValues::new(5).with("bytes", 10.0).with("rows", 1.0),
            TimedValues::new(7).with("bytes", 30.0).with("rows", 1.0),
            TimedValues::new(9).with("bytes", 20.0).with("rows", 1.0),
        ];
        let out = bucket(
            &samples,
            BucketSpec::new(TimeUnit::Millisecond, 10),
            &ops(&[("bytes", AggregationOp::Max), ("rows", AggregationOp::Count)]),
        );

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].values["bytes"], 30.0);
        assert_eq!(out[0].values["rows"], 3.0);
    }

    #[test]
    fn output_is_sorted_even_for_unsorted_input() {
        let samples = vec![
            TimedValues::new(3_000).with("v", 1.0),
            TimedValues::new(1_000).with("v", 1.0),
            TimedValues::new(2_500).with("v", 1.0),
        ];
        let out = bucket(
            &samples,
            BucketSpec::new(TimeUnit::Second, 1),
            &ops(&[("v", AggregationOp::Sum)]),
        );
        let times: Vec<i64> = out.iter().map(|entry| entry.time).collect();
        assert_eq!(times, vec![1_000, 2_000, 3_000]);
    }

    #[test]
    fn negative_times_floor_toward_negative_infinity() {
        let spec = BucketSpec::new(TimeUnit::Second, 1);
        assert_eq!(spec.bucket_start(-1), Some(-1_000));
        assert_eq!(spec.bucket_start(-1_000), Some(-1_000));
    }

    #[test]
    fn oversized_widths_saturate() {
        let spec = BucketSpec::new(TimeUnit::Year, 300_000_000);
        assert_eq!(spec.width_ms(), i64::MAX);
        assert_eq!(spec.bucket_start(1_696_723_200_000), Some(0));
    }

    #[test]
    fn unrepresentable_bucket_starts_are_skipped() {
        let spec = BucketSpec::new(TimeUnit::Second, 1);
        assert_eq!(spec.bucket_start(i64::MIN), None);

        let samples = vec![
            TimedValues::new(i64::MIN).with("v", 5.0),
            TimedValues::new(1_500).with("v", 1.0),
        ];
        let out = bucket(&samples, spec, &ops(&[("v", AggregationOp::Sum)]));

        assert_eq!(out, vec![TimedValues::new(1_000).with("v", 1.0)]);
    }

    #[test]
    fn unit_names_parse_case_insensitively() {
        assert_eq!("Hour".parse::<TimeUnit>().expect("unit"), TimeUnit::Hour);
        assert!("fortnight".parse::<TimeUnit>().is_err());
    }
}
