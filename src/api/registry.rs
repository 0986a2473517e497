use indexmap::IndexMap;
use tracing::debug;

use crate::core::FieldMetadata;
use crate::error::{ChartError, ChartResult};

use super::ChartTypeDefinition;
use super::charts::builtin_chart_types;

/// Append-only catalog of chart types, keyed by exact id.
///
/// Owned by the host's composition root and passed by reference; there is no
/// process-wide instance. Registration needs `&mut self`, so a registry shared
/// across threads after startup must be wrapped in a lock by its owner.
#[derive(Debug, Clone, Default)]
pub struct ChartRegistry {
    definitions: IndexMap<String, ChartTypeDefinition>,
}

impl ChartRegistry {
    /// Empty registry, mostly useful for fixtures.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the four built-in chart types.
    #[must_use]
    pub fn with_builtin_chart_types() -> Self {
        let mut registry = Self::new();
        for definition in builtin_chart_types() {
            registry.definitions.insert(definition.id.clone(), definition);
        }
        debug!(chart_types = registry.len(), "registered built-in chart types");
        registry
    }

    pub fn register(&mut self, definition: ChartTypeDefinition) -> ChartResult<()> {
        if definition.id.is_empty() {
            return Err(ChartError::InvalidConfig(
                "chart type id must not be empty".to_owned(),
            ));
        }
        if self.definitions.contains_key(&definition.id) {
            return Err(ChartError::DuplicateChartType(definition.id));
        }
        debug!(chart_type = %definition.id, "registered chart type");
        self.definitions.insert(definition.id.clone(), definition);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ChartTypeDefinition> {
        self.definitions.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.definitions.contains_key(id)
    }

    /// Definitions in registration order.
    pub fn all(&self) -> impl Iterator<Item = &ChartTypeDefinition> {
        self.definitions.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Chart types that can chart exactly `fields`.
    ///
    /// A definition qualifies when the field count is within its bounds, a
    /// time field is present if it needs one, and at least one field type is
    /// supported.
    #[must_use]
    pub fn compatible_with(&self, fields: &[FieldMetadata]) -> Vec<&ChartTypeDefinition> {
        let has_time_field = fields.iter().any(|field| field.is_time_field);
        self.all()
            .filter(|definition| definition.accepts_field_count(fields.len()))
            .filter(|definition| !definition.requires_time_field || has_time_field)
            .filter(|definition| fields.iter().any(|field| definition.supports(field.data_type)))
            .collect()
    }

    /// Chart types that `field` could feed, given every field of the result.
    ///
    /// When a definition needs more than one field, `all_fields` must hold at
    /// least `min_fields` fields of the same data type as `field`.
    #[must_use]
    pub fn compatible_with_field(
        &self,
        field: &FieldMetadata,
        all_fields: &[FieldMetadata],
    ) -> Vec<&ChartTypeDefinition> {
        let has_time_field = all_fields.iter().any(|candidate| candidate.is_time_field);
        let same_type = all_fields
            .iter()
            .filter(|candidate| candidate.data_type == field.data_type)
            .count();
        self.all()
            .filter(|definition| definition.supports(field.data_type))
            .filter(|definition| !definition.requires_time_field || has_time_field)
            .filter(|definition| definition.min_fields <= 1 || same_type >= definition.min_fields)
            .collect()
    }
}
