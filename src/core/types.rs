use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Label used for category/series cells whose value is null or absent.
pub const EMPTY_LABEL: &str = "(empty)";

/// A single cell of a query result row.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
}

impl Scalar {
    /// Stringifies the value the way the query layer prints it.
    ///
    /// Integral numbers carry no fractional suffix (`10`, not `10.0`).
    #[must_use]
    pub fn to_display_string(&self) -> String {
        match self {
            Self::Null => "null".to_owned(),
            Self::Bool(value) => value.to_string(),
            Self::Number(value) => format_number(*value),
            Self::String(value) => value.clone(),
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_owned();
    }
    if value.is_infinite() {
        return if value.is_sign_negative() {
            "-Infinity".to_owned()
        } else {
            "Infinity".to_owned()
        };
    }
    if value == 0.0 {
        return "0".to_owned();
    }
    value.to_string()
}

/// Ordered mapping from field name to cell value.
///
/// Rows are read-only inputs to every reducer; column order is preserved for
/// pre-pivoted (transposed) result sets where series are discovered by column.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(IndexMap<String, Scalar>);

impl Row {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Scalar> {
        self.0.get(field)
    }

    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Scalar)> {
        self.0.iter().map(|(field, value)| (field.as_str(), value))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Grouping label for `field`: the stringified cell, or [`EMPTY_LABEL`]
    /// when the cell is null or the field is absent.
    #[must_use]
    pub fn label(&self, field: &str) -> String {
        match self.get(field) {
            None | Some(Scalar::Null) => EMPTY_LABEL.to_owned(),
            Some(value) => value.to_display_string(),
        }
    }
}

impl<K: Into<String>, V: Into<Scalar>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(field, value)| (field.into(), value.into()))
                .collect(),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    String,
    Number,
    #[default]
    Any,
}

impl DataType {
    /// `Any` on either side matches everything.
    #[must_use]
    pub fn matches(self, other: DataType) -> bool {
        self == other || self == DataType::Any || other == DataType::Any
    }
}

/// Column description produced by the external field analyzer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMetadata {
    pub name: String,
    #[serde(default)]
    pub data_type: DataType,
    #[serde(default)]
    pub is_time_field: bool,
}

impl FieldMetadata {
    #[must_use]
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            is_time_field: false,
        }
    }

    #[must_use]
    pub fn time(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: DataType::Number,
            is_time_field: true,
        }
    }

    #[must_use]
    pub fn with_time_field(mut self, is_time_field: bool) -> Self {
        self.is_time_field = is_time_field;
        self
    }
}

/// Looks up metadata by exact field name.
///
/// `None` means "unknown type, not a time field".
#[must_use]
pub fn find_field<'a>(metadata: &'a [FieldMetadata], name: &str) -> Option<&'a FieldMetadata> {
    metadata.iter().find(|field| field.name == name)
}

#[cfg(test)]
mod tests {
    use super::{DataType, EMPTY_LABEL, Row, Scalar};

    #[test]
    fn labels_follow_display_rules() {
        let row = Row::new()
            .with("int", 10.0)
            .with("frac", 1.5)
            .with("flag", true)
            .with("blank", "")
            .with("nothing", Scalar::Null);

        assert_eq!(row.label("int"), "10");
        assert_eq!(row.label("frac"), "1.5");
        assert_eq!(row.label("flag"), "true");
        assert_eq!(row.label("blank"), "");
        assert_eq!(row.label("nothing"), EMPTY_LABEL);
        assert_eq!(row.label("missing"), EMPTY_LABEL);
    }

    #[test]
    fn negative_zero_prints_as_zero() {
        assert_eq!(Scalar::Number(-0.0).to_display_string(), "0");
    }

    #[test]
    fn any_matches_every_data_type() {
        assert!(DataType::Any.matches(DataType::String));
        assert!(DataType::Number.matches(DataType::Any));
        assert!(!DataType::Number.matches(DataType::String));
    }

    #[test]
    fn row_json_preserves_column_order() {
        let row: Row = serde_json::from_str(r#"{"b":1,"a":"x","c":null}"#).expect("row json");
        let columns: Vec<&str> = row.columns().collect();
        assert_eq!(columns, vec!["b", "a", "c"]);
        assert_eq!(row.get("c"), Some(&Scalar::Null));
    }
}
