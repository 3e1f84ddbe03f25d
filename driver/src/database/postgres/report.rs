use std::collections::HashMap;

use rust_decimal::Decimal;
use sqlx::PgConnection;
use time::OffsetDateTime;

use kernel::interface::database::DatabaseConnection;
use kernel::interface::query::SalesReportQuery;
use kernel::interface::update::SalesReportModifier;
use kernel::prelude::entity::{
    BookId, BookPrice, BookSnapshot, BookTitle, SalesReport, SalesReportId, TopSellingBook,
};
use kernel::KernelError;

use crate::database::postgres::PostgresDatabase;
use crate::error::ConvertError;

pub struct PostgresSalesReportRepository {
    db: PostgresDatabase,
}

impl PostgresSalesReportRepository {
    pub fn new(db: PostgresDatabase) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl SalesReportQuery for PostgresSalesReportRepository {
    async fn find_by_id(
        &self,
        id: &SalesReportId,
    ) -> error_stack::Result<Option<SalesReport>, KernelError> {
        let mut con = self.db.acquire().await?;
        PgSalesReportInternal::find_by_id(&mut con, id).await
    }

    async fn find_all(&self) -> error_stack::Result<Vec<SalesReport>, KernelError> {
        let mut con = self.db.acquire().await?;
        PgSalesReportInternal::find_all(&mut con).await
    }
}

#[async_trait::async_trait]
impl SalesReportModifier for PostgresSalesReportRepository {
    async fn save(&self, report: &SalesReport) -> error_stack::Result<SalesReport, KernelError> {
        let mut transaction = self.db.transact().await?;
        let saved = PgSalesReportInternal::save(&mut transaction, report).await;
        transaction.finish(saved).await
    }
}

#[derive(sqlx::FromRow)]
struct SalesReportRow {
    id: i32,
    timestamp: OffsetDateTime,
    total_revenue: Decimal,
    total_orders: i32,
    successful_orders: i32,
    pending_orders: i32,
}

#[derive(sqlx::FromRow)]
struct TopSellingBookRow {
    sales_report_id: i32,
    book_id: i32,
    book_title: Option<String>,
    book_price: Option<Decimal>,
    quantity_sold: i32,
    total_revenue: Decimal,
}

impl From<TopSellingBookRow> for TopSellingBook {
    fn from(value: TopSellingBookRow) -> Self {
        TopSellingBook::new(
            BookSnapshot::new(
                BookId::new(value.book_id),
                value.book_title.map(BookTitle::new),
                value.book_price.map(BookPrice::new),
            ),
            value.quantity_sold,
            value.total_revenue,
        )
    }
}

impl SalesReportRow {
    fn into_report(self, top_selling_books: Vec<TopSellingBook>) -> SalesReport {
        SalesReport::new(
            SalesReportId::new(self.id),
            self.timestamp,
            self.total_revenue,
            self.total_orders,
            self.successful_orders,
            self.pending_orders,
            top_selling_books,
        )
    }
}

pub(in crate::database) struct PgSalesReportInternal;

impl PgSalesReportInternal {
    async fn find_by_id(
        con: &mut PgConnection,
        id: &SalesReportId,
    ) -> error_stack::Result<Option<SalesReport>, KernelError> {
        let row = sqlx::query_as::<_, SalesReportRow>(
            // language=postgresql
            r#"
            SELECT id, timestamp, total_revenue, total_orders, successful_orders, pending_orders
            FROM sales_reports
            WHERE id = $1
            "#,
        )
        .bind(id.as_ref())
        .fetch_optional(&mut *con)
        .await
        .convert_error()?;
        let Some(row) = row else {
            return Ok(None);
        };
        let books = sqlx::query_as::<_, TopSellingBookRow>(
            // language=postgresql
            r#"
            SELECT sales_report_id, book_id, book_title, book_price, quantity_sold, total_revenue
            FROM top_selling_books
            WHERE sales_report_id = $1
            ORDER BY rank
            "#,
        )
        .bind(id.as_ref())
        .fetch_all(&mut *con)
        .await
        .convert_error()?;
        Ok(Some(
            row.into_report(books.into_iter().map(TopSellingBook::from).collect()),
        ))
    }

    async fn find_all(
        con: &mut PgConnection,
    ) -> error_stack::Result<Vec<SalesReport>, KernelError> {
        let rows = sqlx::query_as::<_, SalesReportRow>(
            // language=postgresql
            r#"
            SELECT id, timestamp, total_revenue, total_orders, successful_orders, pending_orders
            FROM sales_reports
            ORDER BY timestamp DESC, id DESC
            "#,
        )
        .fetch_all(&mut *con)
        .await
        .convert_error()?;
        let book_rows = sqlx::query_as::<_, TopSellingBookRow>(
            // language=postgresql
            r#"
            SELECT sales_report_id, book_id, book_title, book_price, quantity_sold, total_revenue
            FROM top_selling_books
            ORDER BY sales_report_id, rank
            "#,
        )
        .fetch_all(&mut *con)
        .await
        .convert_error()?;

        let mut books: HashMap<i32, Vec<TopSellingBook>> = HashMap::new();
        for row in book_rows {
            books.entry(row.sales_report_id).or_default().push(row.into());
        }
        Ok(rows
            .into_iter()
            .map(|row| {
                let top = books.remove(&row.id).unwrap_or_default();
                row.into_report(top)
            })
            .collect())
    }

    async fn save(
        con: &mut PgConnection,
        report: &SalesReport,
    ) -> error_stack::Result<SalesReport, KernelError> {
        let id: i32 = sqlx::query_scalar(
            // language=postgresql
            r#"
            INSERT INTO sales_reports (timestamp, total_revenue, total_orders, successful_orders, pending_orders)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(report.timestamp())
        .bind(report.total_revenue())
        .bind(report.total_orders())
        .bind(report.successful_orders())
        .bind(report.pending_orders())
        .fetch_one(&mut *con)
        .await
        .convert_error()?;

        for (rank, top) in (1i32..).zip(report.top_selling_books()) {
            // language=postgresql
            sqlx::query(
                r#"
                INSERT INTO top_selling_books
                    (sales_report_id, rank, book_id, book_title, book_price, quantity_sold, total_revenue)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(id)
            .bind(rank)
            .bind(top.book().id().as_ref())
            .bind(top.book().title().as_ref().map(AsRef::<String>::as_ref))
            .bind(top.book().price().as_ref().map(AsRef::<Decimal>::as_ref))
            .bind(top.quantity_sold())
            .bind(top.revenue())
            .execute(&mut *con)
            .await
            .convert_error()?;
        }
        Ok(report.clone().with_id(SalesReportId::new(id)))
    }
}

#[cfg(test)]
mod test {
    use rust_decimal::Decimal;
    use time::OffsetDateTime;

    use kernel::interface::query::SalesReportQuery;
    use kernel::interface::update::SalesReportModifier;
    use kernel::prelude::entity::{
        BookId, BookPrice, BookSnapshot, BookTitle, SalesReport, SalesReportId, TopSellingBook,
    };
    use kernel::KernelError;

    use crate::database::postgres::PostgresDatabase;
    use crate::database::PostgresSalesReportRepository;

    #[test_with::env(POSTGRES_TEST)]
    #[tokio::test]
    async fn test() -> error_stack::Result<(), KernelError> {
        let db = PostgresDatabase::new().await?;
        db.migrate().await?;
        let repository = PostgresSalesReportRepository::new(db);

        let now = OffsetDateTime::now_utc();
        let timestamp = now.replace_microsecond(now.microsecond()).unwrap();
        let report = SalesReport::new(
            SalesReportId::new(0),
            timestamp,
            Decimal::new(3550, 2),
            2,
            1,
            1,
            vec![
                TopSellingBook::new(
                    BookSnapshot::new(
                        BookId::new(2),
                        Some(BookTitle::new("A")),
                        Some(BookPrice::new(Decimal::new(2550, 2))),
                    ),
                    1,
                    Decimal::new(2550, 2),
                ),
                TopSellingBook::new(
                    BookSnapshot::new(BookId::new(1), None, None),
                    1,
                    Decimal::new(1000, 2),
                ),
            ],
        );
        let saved = repository.save(&report).await?;
        assert!(saved.id().as_ref() > &0);
        assert_eq!(repository.find_by_id(saved.id()).await?, Some(saved));
        Ok(())
    }
}
