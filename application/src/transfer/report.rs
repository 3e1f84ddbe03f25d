use time::Duration;

/// Timing of the sales aggregation.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct SalesReportConfig {
    pub interval: Duration,
    pub window: Duration,
    /// Added to each order's creation time before the window test.
    pub created_at_offset: Duration,
    pub top_n: usize,
}

impl Default for SalesReportConfig {
    fn default() -> Self {
        Self {
            interval: Duration::hours(24),
            window: Duration::hours(24),
            created_at_offset: Duration::ZERO,
            top_n: 5,
        }
    }
}
