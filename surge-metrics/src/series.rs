use std::time::Duration;

/// Ordered record of per-request round-trip times, in milliseconds.
///
/// Samples are appended in issuance order, so the index of a sample is the
/// request number it was recorded for. The series is append-only while the
/// request loop runs and read-only afterward.
#[derive(Debug, Default, Clone)]
pub struct LatencySeries {
    samples: Vec<f64>,
}

impl LatencySeries {
    pub fn new() -> LatencySeries {
        LatencySeries {
            samples: Vec::new(),
        }
    }

    pub fn push(&mut self, millis: f64) {
        self.samples.push(millis);
    }

    /// Record an elapsed round-trip as a millisecond sample.
    pub fn push_elapsed(&mut self, elapsed: Duration) {
        self.push(elapsed.as_secs_f64() * 1000.0);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }
}

impl From<Vec<f64>> for LatencySeries {
    fn from(samples: Vec<f64>) -> LatencySeries {
        LatencySeries { samples }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn samples_keep_issuance_order() {
        let mut series = LatencySeries::new();
        series.push(30.0);
        series.push(10.0);
        series.push_elapsed(Duration::from_millis(20));
        assert_eq!(series.len(), 3);
        assert_eq!(series.samples(), &[30.0, 10.0, 20.0]);
    }

    #[test]
    fn new_series_is_empty() {
        let series = LatencySeries::new();
        assert!(series.is_empty());
        assert_eq!(series.len(), 0);
    }
}
