use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::{FieldMetadata, Row};
use crate::error::{ChartError, ChartResult};
use crate::render::ChartRenderer;

use super::{
    ChartConfig, ChartRegistry, ChartSpec, ChartTypeDefinition, DisplayOverrides, ValidationResult,
    apply_overrides,
};

/// Everything needed to build one chart: query output plus the chart setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartRequest {
    #[serde(default)]
    pub rows: Vec<Row>,
    #[serde(default)]
    pub fields: Vec<FieldMetadata>,
    pub config: ChartConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overrides: Option<DisplayOverrides>,
}

/// Composition root: registry lookup, validation, transformation, display
/// overrides and hand-off to a renderer.
///
/// Transformation is pure; the engine never mutates rows or metadata and
/// keeps no state between calls beyond its registry.
#[derive(Debug, Clone, Default)]
pub struct ChartEngine {
    registry: ChartRegistry,
}

impl ChartEngine {
    #[must_use]
    pub fn new(registry: ChartRegistry) -> Self {
        Self { registry }
    }

    #[must_use]
    pub fn with_builtin_chart_types() -> Self {
        Self::new(ChartRegistry::with_builtin_chart_types())
    }

    #[must_use]
    pub fn registry(&self) -> &ChartRegistry {
        &self.registry
    }

    pub fn register(&mut self, definition: ChartTypeDefinition) -> ChartResult<()> {
        self.registry.register(definition)
    }

    /// Checks `config` against its chart type. Unknown ids are invalid.
    #[must_use]
    pub fn validate(&self, config: &ChartConfig, metadata: &[FieldMetadata]) -> ValidationResult {
        match self.registry.get(&config.chart_type_id) {
            Some(definition) => definition.validate(config, metadata),
            None => ValidationResult::invalid(format!(
                "Unknown chart type: {}",
                config.chart_type_id
            )),
        }
    }

    /// Validates, transforms and applies `overrides`.
    ///
    /// The transformer is never invoked for a rejected config.
    pub fn build_spec(
        &self,
        rows: &[Row],
        config: &ChartConfig,
        metadata: &[FieldMetadata],
        overrides: Option<&DisplayOverrides>,
    ) -> ChartResult<ChartSpec> {
        let definition = self
            .registry
            .get(&config.chart_type_id)
            .ok_or_else(|| ChartError::UnknownChartType(config.chart_type_id.clone()))?;

        let validation = definition.validate(config, metadata);
        if !validation.valid {
            debug!(
                chart_type = %definition.id,
                error = validation.error.as_deref().unwrap_or_default(),
                "chart configuration rejected"
            );
            validation.into_result()?;
        }

        let spec = definition
            .transform(rows, config, metadata)
            .inspect_err(|err| {
                warn!(chart_type = %definition.id, error = %err, "chart transformer failed");
            })?;

        Ok(match overrides {
            Some(overrides) if !overrides.is_empty() => apply_overrides(spec, overrides),
            _ => spec,
        })
    }

    pub fn build_request(&self, request: &ChartRequest) -> ChartResult<ChartSpec> {
        self.build_spec(
            &request.rows,
            &request.config,
            &request.fields,
            request.overrides.as_ref(),
        )
    }

    /// Builds the spec and hands it to `renderer`. Returns the rendered spec.
    pub fn render<R: ChartRenderer>(
        &self,
        renderer: &mut R,
        rows: &[Row],
        config: &ChartConfig,
        metadata: &[FieldMetadata],
        overrides: Option<&DisplayOverrides>,
    ) -> ChartResult<ChartSpec> {
        let spec = self.build_spec(rows, config, metadata, overrides)?;
        renderer.render(&spec)?;
        Ok(spec)
    }

    #[must_use]
    pub fn compatible_chart_types(&self, metadata: &[FieldMetadata]) -> Vec<&ChartTypeDefinition> {
        self.registry.compatible_with(metadata)
    }
}
