mod id;
mod top_selling;
mod window;

pub use self::{id::*, top_selling::*, window::*};
use destructure::Destructure;
use rust_decimal::Decimal;
use time::OffsetDateTime;
use vodca::References;

/// Append-only summary of the orders inside one report window.
#[derive(Debug, Clone, Eq, PartialEq, References, Destructure)]
pub struct SalesReport {
    id: SalesReportId,
    timestamp: OffsetDateTime,
    total_revenue: Decimal,
    total_orders: i32,
    successful_orders: i32,
    pending_orders: i32,
    top_selling_books: Vec<TopSellingBook>,
}

impl SalesReport {
    pub fn new(
        id: SalesReportId,
        timestamp: OffsetDateTime,
        total_revenue: impl Into<Decimal>,
        total_orders: i32,
        successful_orders: i32,
        pending_orders: i32,
        top_selling_books: Vec<TopSellingBook>,
    ) -> Self {
        Self {
            id,
            timestamp,
            total_revenue: total_revenue.into(),
            total_orders,
            successful_orders,
            pending_orders,
            top_selling_books,
        }
    }

    pub fn with_id(self, id: SalesReportId) -> Self {
        self.reconstruct(|r| r.id = id)
    }
}
