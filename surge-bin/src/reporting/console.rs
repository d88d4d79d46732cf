use std::fmt::{Display, Formatter, Result as FmtResult};
use surge_metrics::SummaryStats;

pub const RULE: &str =
    "============================================================";

/// Fixed-format statistics block for the console, all figures rounded to two
/// decimal places (slow percentage to one, matching the original output).
pub struct ConsoleReport<'a> {
    stats: &'a SummaryStats,
    slow_threshold_ms: f64,
}

impl<'a> ConsoleReport<'a> {
    pub fn new(stats: &'a SummaryStats, slow_threshold_ms: f64) -> ConsoleReport<'a> {
        ConsoleReport {
            stats,
            slow_threshold_ms,
        }
    }
}

impl<'a> Display for ConsoleReport<'a> {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        let s = self.stats;
        writeln!(f, "{}", RULE)?;
        writeln!(f, "PERFORMANCE STATISTICS")?;
        writeln!(f, "{}", RULE)?;
        writeln!(f, "Total requests completed: {}", s.count)?;
        writeln!(f, "Average response time:    {:.2}ms", s.mean)?;
        writeln!(f, "Median response time:     {:.2}ms", s.median)?;
        writeln!(f, "Standard deviation:       {:.2}ms", s.std_dev)?;
        writeln!(f, "Min response time:        {:.2}ms", s.min)?;
        writeln!(f, "Max response time:        {:.2}ms", s.max)?;
        writeln!(f, "95th percentile:          {:.2}ms", s.p95)?;
        writeln!(f, "99th percentile:          {:.2}ms", s.p99)?;
        writeln!(f, "{}", RULE)?;
        writeln!(f)?;
        writeln!(
            f,
            "Requests over {}ms: {} ({:.1}%)",
            self.slow_threshold_ms, s.slow_count, s.slow_percentage
        )?;
        write!(
            f,
            "Gap between median and 95th percentile: {:.2}ms",
            s.gap
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use surge_metrics::LatencySeries;

    #[test]
    fn report_contains_every_figure() {
        let series = LatencySeries::from(vec![100.0, 200.0, 300.0, 400.0, 500.0]);
        let stats = SummaryStats::from_series(&series, 500.0).unwrap();
        let text = ConsoleReport::new(&stats, 500.0).to_string();
        assert!(text.contains("Total requests completed: 5"));
        assert!(text.contains("Average response time:    300.00ms"));
        assert!(text.contains("Median response time:     300.00ms"));
        assert!(text.contains("Min response time:        100.00ms"));
        assert!(text.contains("Max response time:        500.00ms"));
        assert!(text.contains("95th percentile:"));
        assert!(text.contains("99th percentile:"));
        assert!(text.contains("Requests over 500ms: 0 (0.0%)"));
        assert!(text.contains("Gap between median and 95th percentile:"));
    }

    #[test]
    fn rule_matches_original_width() {
        assert_eq!(RULE.len(), 60);
        assert!(RULE.chars().all(|c| c == '='));
    }
}
