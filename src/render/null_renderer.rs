use crate::api::ChartSpec;
use crate::error::ChartResult;
use crate::render::ChartRenderer;

/// No-op renderer used by tests and headless callers.
///
/// It still validates the spec so tests can catch malformed output before a
/// real backend sees it.
#[derive(Debug, Default)]
pub struct NullRenderer {
    pub render_count: usize,
    pub last_series_count: usize,
    pub last_point_count: usize,
}

impl ChartRenderer for NullRenderer {
    fn render(&mut self, spec: &ChartSpec) -> ChartResult<()> {
        spec.validate()?;
        self.render_count += 1;
        self.last_series_count = spec.series.len();
        self.last_point_count = spec.series.iter().map(|series| series.data.len()).sum();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::NullRenderer;
    use crate::api::{AxisKind, AxisSpec, ChartSpec, SeriesDatum, SeriesKind, SeriesSpec};
    use crate::render::ChartRenderer;

    fn time_spec(lengths: &[usize]) -> ChartSpec {
        let mut spec = ChartSpec::new("t");
        spec.x_axis = Some(AxisSpec::new(AxisKind::Time));
        spec.series = lengths
            .iter()
            .enumerate()
            .map(|(index, len)| {
                let data = (0..*len)
                    .map(|point| SeriesDatum::TimeValue(point as i64 * 1000, 1.0))
                    .collect();
                SeriesSpec::new(format!("s{index}"), SeriesKind::Line, data)
            })
            .collect();
        spec
    }

    #[test]
    fn records_series_and_point_counts() {
        let mut renderer = NullRenderer::default();
        renderer.render(&time_spec(&[3, 3])).expect("render");

        assert_eq!(renderer.render_count, 1);
        assert_eq!(renderer.last_series_count, 2);
        assert_eq!(renderer.last_point_count, 6);
    }

    #[test]
    fn rejects_ragged_time_series() {
        let mut renderer = NullRenderer::default();
        assert!(renderer.render(&time_spec(&[3, 2])).is_err());
        assert_eq!(renderer.render_count, 0);
    }

    #[test]
    fn rejects_non_finite_values() {
        let mut spec = time_spec(&[1]);
        spec.series[0].data[0] = SeriesDatum::TimeValue(0, f64::NAN);
        assert!(NullRenderer::default().render(&spec).is_err());
    }
}
