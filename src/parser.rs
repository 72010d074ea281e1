// Raw-record parsing: string cleanup, type coercion, field aliasing,
// validation, and skip accounting.
//
// Every failure is per-record: a bad row is logged, counted, and dropped,
// and the batch always runs to completion.
use chrono::Utc;
use tracing::{info, warn};

use crate::errors::ParseError;
use crate::loader;
use crate::types::{
    DraftRecord, FieldValue, RawRecord, TypedRecord, FIELD_CATEGORY, FIELD_ID, FIELD_NAME,
    FIELD_TIMESTAMP, FIELD_VALUE,
};
use crate::util;
use crate::validator;

/// Source name that triggers the legacy field remap pre-pass.
pub const LEGACY_SOURCE: &str = "legacy_system";

/// Alternate key some upstreams use for the record id.
const ALIAS_ITEM_ID: &str = "item_id";

/// Legacy key -> canonical key renames applied before parsing.
const LEGACY_FIELD_MAP: [(&str, &str); 5] = [
    ("legacyId", FIELD_ID),
    ("itemName", FIELD_NAME),
    ("itemValue", FIELD_VALUE),
    ("itemCat", FIELD_CATEGORY),
    ("creationDate", FIELD_TIMESTAMP),
];

/// Result of parsing one batch of raw records.
///
/// `skipped` counts every dropped record; `validation_errors` counts only
/// the subset rejected by the validator. The two stay separate so the
/// instrumentation can tell an unparseable row from an invalid one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseOutcome {
    pub records: Vec<TypedRecord>,
    pub skipped: usize,
    pub validation_errors: usize,
}

/// High-level parsing facade: pulls raw rows from the loader and applies
/// the legacy remap where the source calls for it.
#[derive(Debug, Default)]
pub struct RecordParser;

impl RecordParser {
    pub fn parse(&self, data_source: &str) -> ParseOutcome {
        info!(source = data_source, "initiating parsing process");
        let mut raw = loader::load(data_source);
        if data_source == LEGACY_SOURCE {
            info!("applying legacy field remapping");
            raw = remap_legacy_fields(raw);
        }
        let outcome = parse_raw_records(&raw);
        info!(source = data_source, "parsing process completed");
        outcome
    }
}

/// Rename legacy keys to their canonical names, keeping the canonical key
/// as fallback. A field with a value under neither key is omitted from the
/// output row rather than carried as an empty placeholder; `category`
/// alone falls back to "Unknown". Keys outside the map are dropped.
pub fn remap_legacy_fields(rows: Vec<RawRecord>) -> Vec<RawRecord> {
    rows.into_iter()
        .map(|row| {
            let mut remapped = RawRecord::new();
            for (legacy_key, canonical) in LEGACY_FIELD_MAP {
                match row.get(legacy_key).or_else(|| row.get(canonical)) {
                    Some(value) => {
                        remapped.insert(canonical.to_string(), value.clone());
                    }
                    None if canonical == FIELD_CATEGORY => {
                        remapped.insert(canonical.to_string(), "Unknown".to_string());
                    }
                    None => {}
                }
            }
            remapped
        })
        .collect()
}

/// Parse and validate a batch, independently per record.
pub fn parse_raw_records(raw_records: &[RawRecord]) -> ParseOutcome {
    info!("parsing {} raw records", raw_records.len());
    let mut outcome = ParseOutcome::default();

    for (i, raw) in raw_records.iter().enumerate() {
        let draft = match build_draft(raw) {
            Ok(draft) => draft,
            Err(err) => {
                warn!(record = i + 1, %err, "skipping record");
                outcome.skipped += 1;
                continue;
            }
        };

        match validator::validate(draft).and_then(TypedRecord::try_from) {
            Ok(record) => outcome.records.push(record),
            Err(err) => {
                warn!(record = i + 1, %err, "skipping invalid record");
                outcome.validation_errors += 1;
                outcome.skipped += 1;
            }
        }
    }

    info!("successfully parsed {} records", outcome.records.len());
    info!(
        "skipped {} records ({} due to validation failures)",
        outcome.skipped, outcome.validation_errors
    );
    outcome
}

/// Coerce one raw row into a draft record.
fn build_draft(raw: &RawRecord) -> Result<DraftRecord, ParseError> {
    let cleaned_name = util::title_case(&util::sanitize(
        raw.get(FIELD_NAME).map(String::as_str).unwrap_or(""),
    ));

    let (Some(id_raw), Some(value_raw)) = (raw.get(FIELD_ID), raw.get(FIELD_VALUE)) else {
        return Err(ParseError::MissingEssentialField);
    };

    let id = util::parse_i64_field(id_raw).ok_or_else(|| ParseError::InvalidNumericFormat {
        field: FIELD_ID,
        value: id_raw.clone(),
    })?;
    let value = util::parse_f64_field(value_raw).ok_or_else(|| ParseError::InvalidNumericFormat {
        field: FIELD_VALUE,
        value: value_raw.clone(),
    })?;
    let category = raw
        .get(FIELD_CATEGORY)
        .map(String::as_str)
        .unwrap_or("Unknown")
        .trim()
        .to_uppercase();
    let timestamp = match raw.get(FIELD_TIMESTAMP) {
        Some(s) => util::parse_timestamp(s).ok_or_else(|| ParseError::InvalidTimestamp {
            value: s.clone(),
        })?,
        None => Utc::now(),
    };

    let mut draft = DraftRecord::new();
    draft.insert(FIELD_ID.to_string(), FieldValue::Int(id));
    draft.insert(FIELD_NAME.to_string(), FieldValue::Text(cleaned_name));
    draft.insert(FIELD_VALUE.to_string(), FieldValue::Float(value));
    draft.insert(FIELD_CATEGORY.to_string(), FieldValue::Text(category));
    draft.insert(
        FIELD_TIMESTAMP.to_string(),
        FieldValue::Timestamp(timestamp),
    );

    // Alias precedence runs after coercion and fires only when the
    // canonical key was absent from the raw row. Rows without a raw id
    // were already dropped above, so the alias never rescues a record.
    if !raw.contains_key(FIELD_ID) {
        if let Some(alias_raw) = raw.get(ALIAS_ITEM_ID) {
            let alias_id = util::parse_i64_field(alias_raw).ok_or_else(|| {
                ParseError::InvalidNumericFormat {
                    field: ALIAS_ITEM_ID,
                    value: alias_raw.clone(),
                }
            })?;
            draft.insert(FIELD_ID.to_string(), FieldValue::Int(alias_id));
        }
    }

    Ok(draft)
}
