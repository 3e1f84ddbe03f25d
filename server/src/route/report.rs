mod response;

use self::response::Presenter;
use crate::controller::Controller;
use crate::error::ErrorStatus;
use crate::handler::AppModule;
use application::service::SalesReportService;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::Router;
use kernel::prelude::entity::SalesReportId;

pub trait ReportRouter {
    fn route_report(self) -> Self;
}

impl ReportRouter for Router<AppModule> {
    fn route_report(self) -> Self {
        self.route(
            "/reports/sales",
            get(|State(module): State<AppModule>| async move {
                Controller::new((), Presenter)
                    .bypass(|| module.get_all_sales_reports())
                    .await
                    .map_err(ErrorStatus::from)
            }),
        )
        .route(
            "/reports/sales/generate",
            post(|State(module): State<AppModule>| async move {
                let config = *module.sales_report_config();
                let cancel = module.shutdown_signal();
                Controller::new((), Presenter)
                    .bypass(|| async move { module.generate_sales_report(&config, &cancel).await })
                    .await
                    .map_err(ErrorStatus::from)
            }),
        )
        .route(
            "/reports/sales/:id",
            get(
                |State(module): State<AppModule>, Path(id): Path<i32>| async move {
                    Controller::new((), Presenter)
                        .bypass(|| async move {
                            module.get_sales_report(&SalesReportId::new(id)).await
                        })
                        .await
                        .map_err(ErrorStatus::from)
                },
            ),
        )
    }
}
