mod null_renderer;

pub use null_renderer::NullRenderer;

use crate::api::ChartSpec;
use crate::error::ChartResult;

/// Contract implemented by any chart drawing backend.
///
/// Backends receive a fully built, renderer-agnostic `ChartSpec`; layout and
/// data reduction are finished before this call.
pub trait ChartRenderer {
    fn render(&mut self, spec: &ChartSpec) -> ChartResult<()>;
}
