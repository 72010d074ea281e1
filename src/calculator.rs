// Aggregate metrics over a batch of typed records.
//
// Free functions cover the stateless aggregates; the exponent transform
// lives on `Calculator`, which holds its configuration for the lifetime
// of the instance. Fields are addressed by name so callers can weight or
// group by any schema key; a key outside the schema behaves like a key
// the records simply do not have.
use indexmap::IndexMap;
use tracing::{debug, error, info, warn};

use crate::math;
use crate::types::{
    CalculatorConfig, CategoryCount, StatisticsSummary, TransformOutcome, TransformedRecord,
    TypedRecord, FIELD_VALUE,
};

/// Sum of `value` across the batch. Never fails; a record without a
/// numeric value contributes 0.
pub fn total_value(records: &[TypedRecord]) -> f64 {
    info!("calculating total value for {} records", records.len());
    let mut total = 0.0;
    for record in records {
        total = math::add(total, record.numeric_field(FIELD_VALUE).unwrap_or(0.0));
    }
    info!(total, "total value calculated");
    total
}

/// Average of `value` weighted by the field named `weight_key`.
///
/// Records where either side is not numeric are skipped and count toward
/// neither sum. A zero total weight (including the empty batch) yields
/// 0.0 with a warning rather than a division by zero.
pub fn weighted_average(records: &[TypedRecord], weight_key: &str) -> f64 {
    info!(
        "calculating weighted average for {} records, weighted by '{}'",
        records.len(),
        weight_key
    );
    let mut weighted_sum = 0.0;
    let mut weight_sum = 0.0;
    let mut used = 0usize;
    for record in records {
        match (
            record.numeric_field(FIELD_VALUE),
            record.numeric_field(weight_key),
        ) {
            (Some(value), Some(weight)) => {
                weighted_sum = math::add(weighted_sum, math::multiply(value, weight));
                weight_sum = math::add(weight_sum, weight);
                used += 1;
            }
            _ => debug!(
                record_id = record.id,
                weight_key, "skipping record with non-numeric fields for weighted average"
            ),
        }
    }

    if weight_sum == 0.0 {
        warn!(
            "total weight is zero after processing {} usable records, returning 0",
            used
        );
        return 0.0;
    }
    match math::divide(weighted_sum, weight_sum) {
        Ok(average) => {
            info!("weighted average calculated using {} records: {}", used, average);
            average
        }
        Err(err) => {
            warn!(%err, "weighted average division failed, returning 0");
            0.0
        }
    }
}

/// Distribution statistics for the field named `key`.
///
/// No numeric values yields the all-zero summary with `count == 0`. A
/// single value has a standard deviation of 0; a failed standard
/// deviation computation is reported as NaN instead of propagating.
pub fn value_statistics(records: &[TypedRecord], key: &str) -> StatisticsSummary {
    info!(
        "calculating statistics for key '{}' on {} records",
        key,
        records.len()
    );
    let values: Vec<f64> = records.iter().filter_map(|r| r.numeric_field(key)).collect();
    if values.is_empty() {
        warn!(key, "no valid numeric data found, returning empty statistics");
        return StatisticsSummary::empty();
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mean = math::mean(&values).unwrap_or(0.0);
    let std_dev = if values.len() >= 2 {
        match math::std_dev(&values) {
            Ok(sd) => sd,
            Err(err) => {
                error!(%err, "could not calculate standard deviation");
                f64::NAN
            }
        }
    } else {
        0.0
    };

    let summary = StatisticsSummary {
        count: values.len(),
        min,
        max,
        mean,
        std_dev,
    };
    info!(?summary, key, "statistics calculated");
    summary
}

/// Top-N frequency of the field named `key`.
///
/// Only records lacking the key are excluded; a present field holding
/// "Unknown" still counts. Entries come back sorted by count descending,
/// ties in first-seen order, truncated to `top_n`.
pub fn most_common_categories(
    records: &[TypedRecord],
    key: &str,
    top_n: usize,
) -> Vec<CategoryCount> {
    info!("finding top {} most common values for key '{}'", top_n, key);
    let mut counts: IndexMap<String, usize> = IndexMap::new();
    for record in records {
        if let Some(value) = record.field_display(key) {
            *counts.entry(value).or_insert(0) += 1;
        }
    }
    if counts.is_empty() {
        warn!(key, "no data found for category key");
        return Vec::new();
    }

    let mut ranked: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(category, count)| CategoryCount { category, count })
        .collect();
    // Stable sort keeps first-seen order among equal counts.
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(top_n);
    info!(?ranked, "most common values computed");
    ranked
}

/// Calculator with configuration fixed at construction.
#[derive(Debug, Clone)]
pub struct Calculator {
    config: CalculatorConfig,
}

impl Calculator {
    pub fn new(config: CalculatorConfig) -> Self {
        Calculator { config }
    }

    pub fn config(&self) -> &CalculatorConfig {
        &self.config
    }

    /// Raise each record's `key` value to the configured exponent.
    ///
    /// The output always has the same length as the input: a record whose
    /// value cannot be transformed (non-numeric source field, or a power
    /// computation that is undefined) carries `None` and bumps the issue
    /// counter instead of being dropped.
    pub fn transform_values(&self, records: &[TypedRecord], key: &str) -> TransformOutcome {
        info!(
            "transforming values for {} records using exponent {}",
            records.len(),
            self.config.exponent
        );
        let mut transformed_records = Vec::with_capacity(records.len());
        let mut issues = 0usize;
        for record in records {
            let transformed = match record.numeric_field(key) {
                Some(original) => match math::power(original, self.config.exponent) {
                    Ok(value) => Some(value),
                    Err(err) => {
                        warn!(record_id = record.id, %err, "could not transform value");
                        issues += 1;
                        None
                    }
                },
                None => {
                    debug!(
                        record_id = record.id,
                        key, "skipping transformation for non-numeric field"
                    );
                    issues += 1;
                    None
                }
            };
            transformed_records.push(TransformedRecord {
                record: record.clone(),
                transformed,
            });
        }
        info!("transformation complete, encountered {} issues", issues);
        TransformOutcome {
            records: transformed_records,
            issues,
        }
    }
}
