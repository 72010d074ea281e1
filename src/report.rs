// Summary report assembly.
//
// Wires the parser and calculator together, collects the metrics into an
// ordered mapping, and renders the final report text. Rendering never
// fails: an empty parse result produces a degraded "no data" body.
use chrono::Utc;
use indexmap::IndexMap;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};
use tracing::{info, warn};

use crate::calculator::{self, Calculator};
use crate::parser::RecordParser;
use crate::types::{
    CalculatorConfig, CategoryCount, StatisticsSummary, TypedRecord, FIELD_CATEGORY, FIELD_ID,
    FIELD_VALUE,
};
use crate::util::format_number;

const REPORT_TITLE: &str = "Data Analysis Summary Report";

/// Machine-readable face of the summary report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    pub source: String,
    pub processed_records: usize,
    pub total_value: f64,
    pub weighted_average_by_id: f64,
    pub value_statistics: StatisticsSummary,
    pub most_common_categories: Vec<CategoryCount>,
}

/// Generates the summary report for one data source.
pub struct ReportGenerator {
    data_source: String,
    parser: RecordParser,
    calculator: Calculator,
}

impl ReportGenerator {
    pub fn new(data_source: impl Into<String>, config: CalculatorConfig) -> Self {
        info!(?config, "report generator initialized");
        ReportGenerator {
            data_source: data_source.into(),
            parser: RecordParser,
            calculator: Calculator::new(config),
        }
    }

    /// Generate the full report text.
    pub fn generate_summary_report(&self) -> String {
        info!(source = %self.data_source, "generating summary report");
        let outcome = self.parser.parse(&self.data_source);
        if outcome.records.is_empty() {
            warn!("no data parsed, cannot generate full report");
            let mut data_points = IndexMap::new();
            data_points.insert("status", "Failed - No Data".to_string());
            data_points.insert("source", self.data_source.clone());
            return render_summary(
                REPORT_TITLE,
                &data_points,
                "No data available for analysis.",
            );
        }

        let summary = self.summarize(&outcome.records);
        let mut data_points = IndexMap::new();
        data_points.insert(
            "processed_records",
            summary.processed_records.to_string(),
        );
        data_points.insert("total_value", format_number(summary.total_value, 2));
        data_points.insert(
            "weighted_average_by_id",
            format_number(summary.weighted_average_by_id, 2),
        );
        data_points.insert(
            "value_statistics",
            format!("\n{}", format_statistics(&summary.value_statistics)),
        );
        data_points.insert(
            "most_common_categories",
            format!(
                "\n{}",
                format_common_categories(&summary.most_common_categories)
            ),
        );

        let report = render_summary(REPORT_TITLE, &data_points, "");
        info!("summary report generated successfully");
        report
    }

    /// Compute the metrics for an already-parsed batch.
    pub fn summarize(&self, records: &[TypedRecord]) -> ReportSummary {
        ReportSummary {
            source: self.data_source.clone(),
            processed_records: records.len(),
            total_value: calculator::total_value(records),
            weighted_average_by_id: calculator::weighted_average(records, FIELD_ID),
            value_statistics: calculator::value_statistics(records, FIELD_VALUE),
            most_common_categories: calculator::most_common_categories(
                records,
                FIELD_CATEGORY,
                self.calculator.config().top_n_categories,
            ),
        }
    }
}

#[derive(Tabled)]
struct StatisticsRow {
    #[tabled(rename = "Count")]
    count: usize,
    #[tabled(rename = "Min")]
    min: String,
    #[tabled(rename = "Max")]
    max: String,
    #[tabled(rename = "Mean")]
    mean: String,
    #[tabled(rename = "StdDev")]
    std_dev: String,
}

/// Render one statistic, keeping NaN visible instead of formatting it
/// away.
fn format_stat(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else {
        format_number(value, 2)
    }
}

fn format_statistics(stats: &StatisticsSummary) -> String {
    if stats.count == 0 {
        return "N/A (No valid data)".to_string();
    }
    let row = StatisticsRow {
        count: stats.count,
        min: format_stat(stats.min),
        max: format_stat(stats.max),
        mean: format_stat(stats.mean),
        std_dev: format_stat(stats.std_dev),
    };
    Table::new([row]).with(Style::markdown()).to_string()
}

fn format_common_categories(categories: &[CategoryCount]) -> String {
    if categories.is_empty() {
        return "N/A".to_string();
    }
    Table::new(categories.iter().cloned())
        .with(Style::markdown())
        .to_string()
}

/// Render the report body: header with timestamp, one line per metric,
/// optional notes, end marker.
fn render_summary(
    title: &str,
    data_points: &IndexMap<&'static str, String>,
    notes: &str,
) -> String {
    let mut out = format!("--- {} ---\n", title.to_uppercase());
    out.push_str(&format!("Timestamp: {}\n\n", Utc::now().to_rfc3339()));
    for (key, value) in data_points {
        out.push_str(&format!("- {}: {}\n", label(key), value));
    }
    if !notes.is_empty() {
        out.push_str(&format!("\nNotes:\n{}\n", notes));
    }
    out.push_str("--- END OF SUMMARY ---");
    out
}

/// `weighted_average_by_id` -> `Weighted average by id`.
fn label(key: &str) -> String {
    let spaced = key.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => spaced,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator(source: &str) -> ReportGenerator {
        ReportGenerator::new(source, CalculatorConfig::default())
    }

    #[test]
    fn dummy_source_produces_the_full_report() {
        let report = generator("dummy").generate_summary_report();
        assert!(report.starts_with("--- DATA ANALYSIS SUMMARY REPORT ---"));
        assert!(report.ends_with("--- END OF SUMMARY ---"));
        assert!(report.contains("- Processed records: 4"));
        assert!(report.contains("- Total value: 100.00"));
        // (1*10 + 2*20 + 3*30 + 4*40) / (1 + 2 + 3 + 4) = 300 / 10
        assert!(report.contains("- Weighted average by id: 30.00"));
        // All four dummy records default to the UNKNOWN category.
        assert!(report.contains("UNKNOWN"));
        // The statistics block renders as a markdown table.
        assert!(report.contains("| Count"));
        assert!(report.contains("StdDev"));
        assert!(report.contains("12.91"));
    }

    #[test]
    fn unknown_source_degrades_instead_of_failing() {
        let report = generator("warehouse").generate_summary_report();
        assert!(report.contains("- Status: Failed - No Data"));
        assert!(report.contains("- Source: warehouse"));
        assert!(report.contains("No data available for analysis."));
        assert!(report.ends_with("--- END OF SUMMARY ---"));
    }

    #[test]
    fn summarize_computes_the_dummy_metrics() {
        let reporter = generator("dummy");
        let outcome = RecordParser.parse("dummy");
        let summary = reporter.summarize(&outcome.records);

        assert_eq!(summary.processed_records, 4);
        assert!((summary.total_value - 100.0).abs() < 1e-9);
        assert!((summary.weighted_average_by_id - 30.0).abs() < 1e-9);
        let stats = summary.value_statistics;
        assert_eq!(stats.count, 4);
        assert_eq!(stats.min, 10.0);
        assert_eq!(stats.max, 40.0);
        assert!((stats.mean - 25.0).abs() < 1e-9);
        // Sample standard deviation over {10, 20, 30, 40}.
        assert!((stats.std_dev - (500.0f64 / 3.0).sqrt()).abs() < 1e-9);
        assert_eq!(summary.most_common_categories.len(), 1);
        assert_eq!(summary.most_common_categories[0].count, 4);
    }

    #[test]
    fn summary_serializes_for_downstream_consumers() {
        let reporter = generator("dummy");
        let outcome = RecordParser.parse("dummy");
        let json = serde_json::to_string(&reporter.summarize(&outcome.records)).unwrap();
        assert!(json.contains("\"processed_records\":4"));
        assert!(json.contains("\"most_common_categories\""));
    }

    #[test]
    fn labels_read_as_prose() {
        assert_eq!(label("processed_records"), "Processed records");
        assert_eq!(label("weighted_average_by_id"), "Weighted average by id");
    }
}
