use std::collections::HashMap;

use error_stack::Report;
use rust_decimal::Decimal;
use time::OffsetDateTime;
use tokio_util::sync::CancellationToken;

use kernel::interface::query::SalesReportQuery;
use kernel::interface::update::{DependOnSalesReportRepository, SalesReportModifier};
use kernel::prelude::entity::{
    Book, BookId, BookSnapshot, Order, OrderStatus, ReportWindow, SalesReport, SalesReportId,
    TopSellingBook,
};
use kernel::KernelError;

use crate::store::{DependOnBookStore, DependOnOrderStore};
use crate::transfer::SalesReportConfig;

struct BookSales {
    book_id: BookId,
    quantity_sold: i32,
    revenue: Decimal,
}

/// Folds the orders inside `window` into one report. Returns `None` as soon
/// as `cancel` fires.
pub fn summarize(
    mut orders: Vec<Order>,
    books: &[Book],
    window: &ReportWindow,
    config: &SalesReportConfig,
    cancel: &CancellationToken,
) -> Option<SalesReport> {
    orders.sort_by(|a, b| {
        a.created_at()
            .cmp(b.created_at())
            .then_with(|| a.id().cmp(b.id()))
    });

    let mut total_revenue = Decimal::ZERO;
    let (mut total_orders, mut successful_orders, mut pending_orders) = (0i32, 0i32, 0i32);
    let mut sales: Vec<BookSales> = Vec::new();
    let mut index: HashMap<BookId, usize> = HashMap::new();

    for order in &orders {
        if cancel.is_cancelled() {
            return None;
        }
        let adjusted = *order.created_at().as_ref() + config.created_at_offset;
        if !window.contains(&adjusted) {
            continue;
        }
        total_orders = total_orders.saturating_add(1);
        total_revenue = total_revenue.saturating_add(*order.total().as_ref());
        match order.status() {
            OrderStatus::Success => successful_orders = successful_orders.saturating_add(1),
            OrderStatus::Pending => pending_orders = pending_orders.saturating_add(1),
        }

        for item in order.items() {
            if cancel.is_cancelled() {
                return None;
            }
            let slot = *index.entry(*item.book_id()).or_insert_with(|| {
                sales.push(BookSales {
                    book_id: *item.book_id(),
                    quantity_sold: 0,
                    revenue: Decimal::ZERO,
                });
                sales.len() - 1
            });
            let entry = &mut sales[slot];
            entry.quantity_sold = entry.quantity_sold.saturating_add(*item.quantity().as_ref());
            entry.revenue = entry.revenue.saturating_add(item.subtotal());
        }
    }

    // Stable, so equal revenues keep first-seen order.
    sales.sort_by(|a, b| b.revenue.cmp(&a.revenue));
    sales.truncate(config.top_n);

    let catalog: HashMap<&BookId, &Book> = books.iter().map(|book| (book.id(), book)).collect();
    let top_selling_books = sales
        .into_iter()
        .map(|sale| {
            let current = catalog.get(&sale.book_id);
            let snapshot = BookSnapshot::new(
                sale.book_id,
                current.map(|book| book.title().clone()),
                current.map(|book| *book.price()),
            );
            TopSellingBook::new(snapshot, sale.quantity_sold, sale.revenue)
        })
        .collect();

    Some(SalesReport::new(
        SalesReportId::new(0),
        *window.end(),
        total_revenue,
        total_orders,
        successful_orders,
        pending_orders,
        top_selling_books,
    ))
}

#[async_trait::async_trait]
pub trait SalesReportService:
    'static + Sync + Send + DependOnOrderStore + DependOnBookStore + DependOnSalesReportRepository
{
    /// Aggregates the trailing window ending now and appends the result.
    /// Nothing is written when the run is cancelled.
    #[tracing::instrument(skip_all)]
    async fn generate_sales_report(
        &self,
        config: &SalesReportConfig,
        cancel: &CancellationToken,
    ) -> error_stack::Result<Option<SalesReport>, KernelError> {
        let window = ReportWindow::trailing(OffsetDateTime::now_utc(), config.window);
        let orders = self.order_store().list_authoritative().await?;
        let books = self.book_store().list_authoritative().await?;

        let summary = summarize(orders, &books, &window, config, cancel);
        let Some(report) = summary.filter(|_| !cancel.is_cancelled()) else {
            tracing::info!("sales report cancelled");
            return Ok(None);
        };
        let saved = self.sales_report_repository().save(&report).await?;
        tracing::info!(
            report = saved.id().as_ref(),
            orders = saved.total_orders(),
            revenue = %saved.total_revenue(),
            "sales report saved"
        );
        Ok(Some(saved))
    }

    async fn get_sales_report(
        &self,
        id: &SalesReportId,
    ) -> error_stack::Result<SalesReport, KernelError> {
        self.sales_report_repository()
            .find_by_id(id)
            .await?
            .ok_or_else(|| {
                Report::new(KernelError::NotFound)
                    .attach_printable(format!("sales report {} does not exist", id.as_ref()))
            })
    }

    async fn get_all_sales_reports(&self) -> error_stack::Result<Vec<SalesReport>, KernelError> {
        self.sales_report_repository().find_all().await
    }
}

impl<T> SalesReportService for T where
    T: DependOnOrderStore + DependOnBookStore + DependOnSalesReportRepository
{
}
