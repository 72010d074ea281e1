// Schema validation for draft records.
//
// Checks run in a fixed order and short-circuit at the first failure:
// field presence, field types, value range, category whitelist, timestamp
// freshness. The category step normalizes instead of rejecting: a value
// outside the whitelist is rewritten to UNKNOWN with a warning. Validation
// consumes the draft and returns the possibly-adjusted record, so no
// caller-visible state is mutated in place.
use std::collections::HashSet;

use chrono::{Duration, Utc};
use once_cell::sync::Lazy;
use tracing::warn;

use crate::errors::ValidationError;
use crate::types::{
    DraftRecord, FieldType, FieldValue, FIELD_CATEGORY, FIELD_ID, FIELD_NAME, FIELD_TIMESTAMP,
    FIELD_VALUE,
};

/// Expected schema, in validation order.
const EXPECTED_SCHEMA: [(&str, FieldType); 5] = [
    (FIELD_ID, FieldType::Int),
    (FIELD_NAME, FieldType::Text),
    (FIELD_VALUE, FieldType::Float),
    (FIELD_CATEGORY, FieldType::Text),
    (FIELD_TIMESTAMP, FieldType::Timestamp),
];

/// Categories accepted as-is; anything else becomes UNKNOWN.
pub static VALID_CATEGORIES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    ["FRUIT", "VEGETABLE", "GRAIN", "DAIRY", "UNKNOWN"]
        .into_iter()
        .collect()
});

const VALUE_MIN: f64 = -1000.0;
const VALUE_MAX: f64 = 10000.0;

/// Clock-skew tolerance for the timestamp freshness check.
const MAX_CLOCK_SKEW_MINUTES: i64 = 5;

/// Validate one draft record against the schema and its constraints.
///
/// Returns the record, with the category possibly normalized, or the
/// first failing reason.
pub fn validate(mut record: DraftRecord) -> Result<DraftRecord, ValidationError> {
    for (field, expected) in EXPECTED_SCHEMA {
        match record.get(field) {
            None => return Err(ValidationError::MissingField(field)),
            Some(value) if value.type_of() != expected => {
                return Err(ValidationError::TypeMismatch {
                    field,
                    expected,
                    actual: value.type_of(),
                });
            }
            Some(_) => {}
        }
    }

    if let Some(FieldValue::Float(value)) = record.get(FIELD_VALUE) {
        if *value < VALUE_MIN || *value > VALUE_MAX {
            return Err(ValidationError::OutOfRange(*value));
        }
    }

    if let Some(FieldValue::Text(category)) = record.get(FIELD_CATEGORY) {
        if !VALID_CATEGORIES.contains(category.as_str()) {
            warn!(
                category = %category,
                "category not in standard list, treating as UNKNOWN"
            );
            record.insert(
                FIELD_CATEGORY.to_string(),
                FieldValue::Text("UNKNOWN".to_string()),
            );
        }
    }

    if let Some(FieldValue::Timestamp(ts)) = record.get(FIELD_TIMESTAMP) {
        if *ts > Utc::now() + Duration::minutes(MAX_CLOCK_SKEW_MINUTES) {
            return Err(ValidationError::FutureTimestamp(*ts));
        }
    }

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone};

    fn past() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 5, 1, 12, 0, 0).unwrap()
    }

    fn draft(value: f64, category: &str) -> DraftRecord {
        let mut d = DraftRecord::new();
        d.insert(FIELD_ID.to_string(), FieldValue::Int(1));
        d.insert(FIELD_NAME.to_string(), FieldValue::Text("Apple".into()));
        d.insert(FIELD_VALUE.to_string(), FieldValue::Float(value));
        d.insert(FIELD_CATEGORY.to_string(), FieldValue::Text(category.into()));
        d.insert(
            FIELD_TIMESTAMP.to_string(),
            FieldValue::Timestamp(past()),
        );
        d
    }

    fn category_of(record: &DraftRecord) -> &str {
        match record.get(FIELD_CATEGORY) {
            Some(FieldValue::Text(c)) => c,
            other => panic!("unexpected category field: {:?}", other),
        }
    }

    #[test]
    fn accepts_a_well_formed_record() {
        let validated = validate(draft(10.5, "FRUIT")).unwrap();
        assert_eq!(category_of(&validated), "FRUIT");
    }

    #[test]
    fn rejects_missing_fields_first() {
        // Record is also out of range; presence must be reported first.
        let mut d = draft(99999.0, "FRUIT");
        d.shift_remove(FIELD_NAME);
        assert_eq!(
            validate(d),
            Err(ValidationError::MissingField(FIELD_NAME))
        );
    }

    #[test]
    fn rejects_type_mismatches() {
        let mut d = draft(10.5, "FRUIT");
        d.insert(FIELD_VALUE.to_string(), FieldValue::Text("10.5".into()));
        assert_eq!(
            validate(d),
            Err(ValidationError::TypeMismatch {
                field: FIELD_VALUE,
                expected: FieldType::Float,
                actual: FieldType::Text,
            })
        );
    }

    #[test]
    fn enforces_inclusive_value_range() {
        assert_eq!(
            validate(draft(10000.1, "FRUIT")),
            Err(ValidationError::OutOfRange(10000.1))
        );
        assert_eq!(
            validate(draft(-1000.5, "FRUIT")),
            Err(ValidationError::OutOfRange(-1000.5))
        );
        // The bounds themselves are allowed.
        assert!(validate(draft(10000.0, "FRUIT")).is_ok());
        assert!(validate(draft(-1000.0, "FRUIT")).is_ok());
    }

    #[test]
    fn normalizes_unlisted_categories_instead_of_rejecting() {
        let validated = validate(draft(10.5, "CANDY")).unwrap();
        assert_eq!(category_of(&validated), "UNKNOWN");

        // UNKNOWN itself is in the whitelist and passes untouched.
        let validated = validate(draft(10.5, "UNKNOWN")).unwrap();
        assert_eq!(category_of(&validated), "UNKNOWN");
    }

    #[test]
    fn range_check_runs_before_category_normalization() {
        assert_eq!(
            validate(draft(99999.0, "CANDY")),
            Err(ValidationError::OutOfRange(99999.0))
        );
    }

    #[test]
    fn rejects_timestamps_beyond_the_skew_window() {
        let future = Utc::now() + Duration::hours(1);
        let mut d = draft(10.5, "FRUIT");
        d.insert(
            FIELD_TIMESTAMP.to_string(),
            FieldValue::Timestamp(future),
        );
        assert_eq!(validate(d), Err(ValidationError::FutureTimestamp(future)));

        // A minute of skew is tolerated.
        let slightly_ahead = Utc::now() + Duration::minutes(1);
        let mut d = draft(10.5, "FRUIT");
        d.insert(
            FIELD_TIMESTAMP.to_string(),
            FieldValue::Timestamp(slightly_ahead),
        );
        assert!(validate(d).is_ok());
    }
}
