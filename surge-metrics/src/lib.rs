mod series;
mod stats;

pub use self::series::LatencySeries;
pub use self::stats::{EmptySeriesError, SummaryStats};
