use crate::controller::Exhaust;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use kernel::prelude::entity::{DestructSalesReport, SalesReport, SalesReportId, TopSellingBook};
use rust_decimal::Decimal;
use serde::Serialize;
use time::OffsetDateTime;

#[derive(Debug, Serialize)]
pub struct SalesReportResponse {
    id: SalesReportId,
    #[serde(with = "time::serde::rfc3339")]
    timestamp: OffsetDateTime,
    total_revenue: Decimal,
    total_orders: i32,
    successful_orders: i32,
    pending_orders: i32,
    top_selling_books: Vec<TopSellingBook>,
}

impl IntoResponse for SalesReportResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

impl From<SalesReport> for SalesReportResponse {
    fn from(report: SalesReport) -> Self {
        let DestructSalesReport {
            id,
            timestamp,
            total_revenue,
            total_orders,
            successful_orders,
            pending_orders,
            top_selling_books,
        } = report.into_destruct();
        Self {
            id,
            timestamp,
            total_revenue,
            total_orders,
            successful_orders,
            pending_orders,
            top_selling_books,
        }
    }
}

pub struct Presenter;

impl Exhaust<SalesReport> for Presenter {
    type To = SalesReportResponse;
    fn emit(&self, input: SalesReport) -> Self::To {
        SalesReportResponse::from(input)
    }
}

impl Exhaust<Vec<SalesReport>> for Presenter {
    type To = Json<Vec<SalesReportResponse>>;
    fn emit(&self, input: Vec<SalesReport>) -> Self::To {
        Json(input.into_iter().map(SalesReportResponse::from).collect())
    }
}

/// A generation interrupted by shutdown has nothing to show.
impl Exhaust<Option<SalesReport>> for Presenter {
    type To = Response;
    fn emit(&self, input: Option<SalesReport>) -> Self::To {
        match input {
            Some(report) => {
                (StatusCode::CREATED, SalesReportResponse::from(report)).into_response()
            }
            None => StatusCode::SERVICE_UNAVAILABLE.into_response(),
        }
    }
}
