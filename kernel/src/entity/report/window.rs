use time::{Duration, OffsetDateTime};
use vodca::References;

/// Closed time interval `[start, end]` scanned by one aggregation run.
#[derive(Debug, Clone, Copy, Eq, PartialEq, References)]
pub struct ReportWindow {
    start: OffsetDateTime,
    end: OffsetDateTime,
}

impl ReportWindow {
    pub fn new(start: OffsetDateTime, end: OffsetDateTime) -> Self {
        Self { start, end }
    }

    pub fn trailing(end: OffsetDateTime, length: Duration) -> Self {
        Self {
            start: end - length,
            end,
        }
    }

    pub fn contains(&self, time: &OffsetDateTime) -> bool {
        self.start <= *time && *time <= self.end
    }
}

#[cfg(test)]
mod test {
    use time::macros::datetime;
    use time::Duration;

    use crate::entity::ReportWindow;

    #[test]
    fn bounds_are_inclusive() {
        let end = datetime!(2024-03-02 12:00 UTC);
        let window = ReportWindow::trailing(end, Duration::hours(24));
        assert_eq!(*window.start(), datetime!(2024-03-01 12:00 UTC));
        assert!(window.contains(&datetime!(2024-03-01 12:00 UTC)));
        assert!(window.contains(&end));
        assert!(!window.contains(&datetime!(2024-03-01 11:59:59 UTC)));
        assert!(!window.contains(&datetime!(2024-03-02 12:00:01 UTC)));
    }
}
