mod chart;
mod console;

pub use self::chart::render_chart;
pub use self::console::{ConsoleReport, RULE};

/// Fixed output filename, written to the working directory.
pub const CHART_FILENAME: &str = "load_test_results.png";
