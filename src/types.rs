use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

use crate::errors::ValidationError;

/// Untyped row as delivered by a loader: field name to raw string value.
/// Insertion order is preserved so diagnostics read like the source row.
pub type RawRecord = IndexMap<String, String>;

/// Coerced field values whose schema conformance is not yet guaranteed.
/// This is what the validator receives and what a [`TypedRecord`] is built
/// from once validation passes.
pub type DraftRecord = IndexMap<String, FieldValue>;

pub const FIELD_ID: &str = "id";
pub const FIELD_NAME: &str = "name";
pub const FIELD_VALUE: &str = "value";
pub const FIELD_CATEGORY: &str = "category";
pub const FIELD_TIMESTAMP: &str = "timestamp";

/// Expected type of a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Int,
    Float,
    Text,
    Timestamp,
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FieldType::Int => "integer",
            FieldType::Float => "float",
            FieldType::Text => "string",
            FieldType::Timestamp => "timestamp",
        };
        f.write_str(name)
    }
}

/// A single coerced field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
}

impl FieldValue {
    pub fn type_of(&self) -> FieldType {
        match self {
            FieldValue::Int(_) => FieldType::Int,
            FieldValue::Float(_) => FieldType::Float,
            FieldValue::Text(_) => FieldType::Text,
            FieldValue::Timestamp(_) => FieldType::Timestamp,
        }
    }
}

/// Fully validated record, immutable once constructed. Every
/// `TypedRecord` handed to the calculator has passed validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypedRecord {
    pub id: i64,
    pub name: String,
    pub value: f64,
    pub category: String,
    pub timestamp: DateTime<Utc>,
}

impl TypedRecord {
    /// Numeric view of a field addressed by name. `None` means the key is
    /// absent from the schema or does not hold a number.
    pub fn numeric_field(&self, key: &str) -> Option<f64> {
        match key {
            FIELD_ID => Some(self.id as f64),
            FIELD_VALUE => Some(self.value),
            _ => None,
        }
    }

    /// Display view of a field addressed by name, used for frequency
    /// counting. `None` means the key is absent from the schema.
    pub fn field_display(&self, key: &str) -> Option<String> {
        match key {
            FIELD_ID => Some(self.id.to_string()),
            FIELD_NAME => Some(self.name.clone()),
            FIELD_VALUE => Some(self.value.to_string()),
            FIELD_CATEGORY => Some(self.category.clone()),
            FIELD_TIMESTAMP => Some(self.timestamp.to_rfc3339()),
            _ => None,
        }
    }
}

fn mismatch(
    field: &'static str,
    expected: FieldType,
    value: &FieldValue,
) -> ValidationError {
    ValidationError::TypeMismatch {
        field,
        expected,
        actual: value.type_of(),
    }
}

fn take_int(draft: &mut DraftRecord, field: &'static str) -> Result<i64, ValidationError> {
    match draft.shift_remove(field) {
        Some(FieldValue::Int(v)) => Ok(v),
        Some(other) => Err(mismatch(field, FieldType::Int, &other)),
        None => Err(ValidationError::MissingField(field)),
    }
}

fn take_float(draft: &mut DraftRecord, field: &'static str) -> Result<f64, ValidationError> {
    match draft.shift_remove(field) {
        Some(FieldValue::Float(v)) => Ok(v),
        Some(other) => Err(mismatch(field, FieldType::Float, &other)),
        None => Err(ValidationError::MissingField(field)),
    }
}

fn take_text(draft: &mut DraftRecord, field: &'static str) -> Result<String, ValidationError> {
    match draft.shift_remove(field) {
        Some(FieldValue::Text(v)) => Ok(v),
        Some(other) => Err(mismatch(field, FieldType::Text, &other)),
        None => Err(ValidationError::MissingField(field)),
    }
}

fn take_timestamp(
    draft: &mut DraftRecord,
    field: &'static str,
) -> Result<DateTime<Utc>, ValidationError> {
    match draft.shift_remove(field) {
        Some(FieldValue::Timestamp(v)) => Ok(v),
        Some(other) => Err(mismatch(field, FieldType::Timestamp, &other)),
        None => Err(ValidationError::MissingField(field)),
    }
}

impl TryFrom<DraftRecord> for TypedRecord {
    type Error = ValidationError;

    fn try_from(mut draft: DraftRecord) -> Result<Self, Self::Error> {
        Ok(TypedRecord {
            id: take_int(&mut draft, FIELD_ID)?,
            name: take_text(&mut draft, FIELD_NAME)?,
            value: take_float(&mut draft, FIELD_VALUE)?,
            category: take_text(&mut draft, FIELD_CATEGORY)?,
            timestamp: take_timestamp(&mut draft, FIELD_TIMESTAMP)?,
        })
    }
}

/// Distribution statistics for one numeric field. `count == 0` is the
/// valid "no data" state, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatisticsSummary {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl StatisticsSummary {
    pub fn empty() -> Self {
        StatisticsSummary {
            count: 0,
            min: 0.0,
            max: 0.0,
            mean: 0.0,
            std_dev: 0.0,
        }
    }
}

/// One category with its occurrence count, ready for table rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct CategoryCount {
    #[tabled(rename = "Category")]
    pub category: String,
    #[tabled(rename = "Count")]
    pub count: usize,
}

/// A record paired with the result of the exponent transform; `None`
/// marks a value the transform could not produce.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformedRecord {
    pub record: TypedRecord,
    pub transformed: Option<f64>,
}

/// Full transform output: same length as the input, plus how many
/// records could not be transformed.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformOutcome {
    pub records: Vec<TransformedRecord>,
    pub issues: usize,
}

/// Calculator knobs, immutable for the lifetime of a
/// [`crate::calculator::Calculator`].
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct CalculatorConfig {
    /// Exponent applied by the value transform.
    pub exponent: f64,
    /// How many categories the frequency report keeps.
    pub top_n_categories: usize,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        CalculatorConfig {
            exponent: 1.5,
            top_n_categories: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn draft() -> DraftRecord {
        let mut d = DraftRecord::new();
        d.insert(FIELD_ID.to_string(), FieldValue::Int(1));
        d.insert(FIELD_NAME.to_string(), FieldValue::Text("Apple".into()));
        d.insert(FIELD_VALUE.to_string(), FieldValue::Float(10.5));
        d.insert(FIELD_CATEGORY.to_string(), FieldValue::Text("FRUIT".into()));
        d.insert(
            FIELD_TIMESTAMP.to_string(),
            FieldValue::Timestamp(Utc.with_ymd_and_hms(2023, 5, 1, 12, 0, 0).unwrap()),
        );
        d
    }

    #[test]
    fn draft_converts_once_complete() {
        let record = TypedRecord::try_from(draft()).unwrap();
        assert_eq!(record.id, 1);
        assert_eq!(record.name, "Apple");
        assert_eq!(record.value, 10.5);
        assert_eq!(record.category, "FRUIT");
    }

    #[test]
    fn draft_conversion_reports_missing_and_mismatched_fields() {
        let mut missing = draft();
        missing.shift_remove(FIELD_VALUE);
        assert_eq!(
            TypedRecord::try_from(missing),
            Err(ValidationError::MissingField(FIELD_VALUE))
        );

        let mut mismatched = draft();
        mismatched.insert(FIELD_VALUE.to_string(), FieldValue::Text("10.5".into()));
        assert_eq!(
            TypedRecord::try_from(mismatched),
            Err(ValidationError::TypeMismatch {
                field: FIELD_VALUE,
                expected: FieldType::Float,
                actual: FieldType::Text,
            })
        );
    }

    #[test]
    fn field_accessors_cover_schema_keys_only() {
        let record = TypedRecord::try_from(draft()).unwrap();
        assert_eq!(record.numeric_field("id"), Some(1.0));
        assert_eq!(record.numeric_field("value"), Some(10.5));
        assert_eq!(record.numeric_field("name"), None);
        assert_eq!(record.field_display("category").as_deref(), Some("FRUIT"));
        assert_eq!(record.field_display("flavor"), None);
    }

    #[test]
    fn config_defaults_match_report_settings() {
        let config = CalculatorConfig::default();
        assert_eq!(config.exponent, 1.5);
        assert_eq!(config.top_n_categories, 3);

        let parsed: CalculatorConfig =
            serde_json::from_str(r#"{"exponent": 2.0, "top_n_categories": 5}"#).unwrap();
        assert_eq!(parsed.exponent, 2.0);
        assert_eq!(parsed.top_n_categories, 5);
    }
}
