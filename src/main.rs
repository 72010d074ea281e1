// Binary wrapper around the report pipeline.
//
// Installs the tracing subscriber, reads the optional REPORT_CONFIG
// override, generates the summary report for the built-in dummy source,
// and prints it. An unhandled panic terminates the process with a
// non-zero status.
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use data_report::{CalculatorConfig, ReportGenerator};

/// Calculator settings, overridable with a JSON `REPORT_CONFIG`
/// environment variable (e.g. `{"exponent": 2.0, "top_n_categories": 5}`).
fn calculator_config_from_env() -> CalculatorConfig {
    match std::env::var("REPORT_CONFIG") {
        Ok(raw) => match serde_json::from_str(&raw) {
            Ok(config) => config,
            Err(err) => {
                warn!(%err, "ignoring malformed REPORT_CONFIG, using defaults");
                CalculatorConfig::default()
            }
        },
        Err(_) => CalculatorConfig::default(),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("application starting");
    let generator = ReportGenerator::new("dummy", calculator_config_from_env());
    let report = generator.generate_summary_report();

    println!("\n--- Generated Report ---");
    println!("{report}");
    println!("--- End of Report ---");
    info!("application finished successfully");
}
