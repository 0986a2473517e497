use serde::{Deserialize, Serialize};
use serde_json::Value;
use smallvec::SmallVec;
use tracing::trace;

use crate::core::{DataType, FieldMetadata, Row};
use crate::error::{ChartError, ChartResult};

use super::{ChartConfig, ChartSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartCategory {
    Category,
    Timeseries,
    Statistical,
}

/// Input widget a host should offer for one option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum OptionKind {
    Select { choices: Vec<String> },
    Number {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
    },
    Toggle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigOptionDescriptor {
    pub id: String,
    pub label: String,
    #[serde(flatten)]
    pub kind: OptionKind,
    pub default: Value,
}

impl ConfigOptionDescriptor {
    #[must_use]
    pub fn select(id: &str, label: &str, choices: &[&str], default: &str) -> Self {
        Self {
            id: id.to_owned(),
            label: label.to_owned(),
            kind: OptionKind::Select {
                choices: choices.iter().map(|choice| (*choice).to_owned()).collect(),
            },
            default: Value::from(default),
        }
    }

    #[must_use]
    pub fn number(id: &str, label: &str, min: Option<f64>, max: Option<f64>, default: f64) -> Self {
        Self {
            id: id.to_owned(),
            label: label.to_owned(),
            kind: OptionKind::Number { min, max },
            default: Value::from(default),
        }
    }

    #[must_use]
    pub fn toggle(id: &str, label: &str, default: bool) -> Self {
        Self {
            id: id.to_owned(),
            label: label.to_owned(),
            kind: OptionKind::Toggle,
            default: Value::from(default),
        }
    }
}

/// Outcome of a compatibility check. `error` is a user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ValidationResult {
    #[must_use]
    pub fn ok() -> Self {
        Self {
            valid: true,
            error: None,
        }
    }

    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: Some(message.into()),
        }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn into_result(self) -> ChartResult<()> {
        if self.valid {
            return Ok(());
        }
        Err(ChartError::Validation(
            self.error
                .unwrap_or_else(|| "configuration is not compatible".to_owned()),
        ))
    }
}

pub type ChartTransformer =
    fn(rows: &[Row], config: &ChartConfig, metadata: &[FieldMetadata]) -> ChartResult<ChartSpec>;

pub type ChartValidator = fn(config: &ChartConfig, metadata: &[FieldMetadata]) -> ValidationResult;

/// A registered chart type: field requirements, option descriptors and the
/// transformer that turns rows into a [`ChartSpec`].
#[derive(Debug, Clone)]
pub struct ChartTypeDefinition {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: ChartCategory,
    pub min_fields: usize,
    pub max_fields: usize,
    pub supported_data_types: SmallVec<[DataType; 3]>,
    pub requires_time_field: bool,
    pub config_options: Vec<ConfigOptionDescriptor>,
    pub transformer: ChartTransformer,
    pub validator: Option<ChartValidator>,
}

impl ChartTypeDefinition {
    /// Definition accepting one field of any type.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: ChartCategory,
        transformer: ChartTransformer,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            category,
            min_fields: 1,
            max_fields: 1,
            supported_data_types: SmallVec::from_slice(&[DataType::Any]),
            requires_time_field: false,
            config_options: Vec::new(),
            transformer,
            validator: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_field_bounds(mut self, min_fields: usize, max_fields: usize) -> Self {
        self.min_fields = min_fields;
        self.max_fields = max_fields.max(min_fields);
        self
    }

    #[must_use]
    pub fn with_supported_data_types(mut self, data_types: &[DataType]) -> Self {
        self.supported_data_types = SmallVec::from_slice(data_types);
        self
    }

    #[must_use]
    pub fn requiring_time_field(mut self) -> Self {
        self.requires_time_field = true;
        self
    }

    #[must_use]
    pub fn with_config_options(mut self, options: Vec<ConfigOptionDescriptor>) -> Self {
        self.config_options = options;
        self
    }

    #[must_use]
    pub fn with_validator(mut self, validator: ChartValidator) -> Self {
        self.validator = Some(validator);
        self
    }

    #[must_use]
    pub fn accepts_field_count(&self, count: usize) -> bool {
        (self.min_fields..=self.max_fields).contains(&count)
    }

    /// Whether `data_type` is among the supported types (`Any` accepts all).
    #[must_use]
    pub fn supports(&self, data_type: DataType) -> bool {
        self.supported_data_types
            .iter()
            .any(|supported| supported.matches(data_type))
    }

    /// Generic checks first (field count, time field presence, options
    /// variant), then the chart type's own validator.
    #[must_use]
    pub fn validate(&self, config: &ChartConfig, metadata: &[FieldMetadata]) -> ValidationResult {
        let field_count = config.fields.len();
        if !self.accepts_field_count(field_count) {
            return ValidationResult::invalid(format!(
                "{} requires between {} and {} fields, got {field_count}",
                self.name, self.min_fields, self.max_fields
            ));
        }

        if self.requires_time_field && !metadata.iter().any(|field| field.is_time_field) {
            return ValidationResult::invalid(format!(
                "No time field available. {} requires a time field.",
                self.name
            ));
        }

        if let Some(options_id) = config.options.chart_type_id() {
            if options_id != self.id {
                return ValidationResult::invalid(format!(
                    "options for `{options_id}` cannot configure {}",
                    self.name
                ));
            }
        }

        match self.validator {
            Some(validator) => validator(config, metadata),
            None => ValidationResult::ok(),
        }
    }

    pub fn transform(
        &self,
        rows: &[Row],
        config: &ChartConfig,
        metadata: &[FieldMetadata],
    ) -> ChartResult<ChartSpec> {
        trace!(chart_type = %self.id, rows = rows.len(), "running chart transformer");
        (self.transformer)(rows, config, metadata)
    }

    /// Serializable description for UI pickers.
    #[must_use]
    pub fn summary(&self) -> ChartTypeSummary {
        ChartTypeSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            category: self.category,
            min_fields: self.min_fields,
            max_fields: self.max_fields,
            supported_data_types: self.supported_data_types.clone(),
            requires_time_field: self.requires_time_field,
            config_options: self.config_options.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartTypeSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: ChartCategory,
    pub min_fields: usize,
    pub max_fields: usize,
    pub supported_data_types: SmallVec<[DataType; 3]>,
    pub requires_time_field: bool,
    pub config_options: Vec<ConfigOptionDescriptor>,
}
