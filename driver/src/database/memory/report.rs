use std::sync::Arc;

use tokio::sync::RwLock;

use kernel::interface::query::SalesReportQuery;
use kernel::interface::update::SalesReportModifier;
use kernel::prelude::entity::{EntityId, SalesReport, SalesReportId};
use kernel::KernelError;

/// Append-only report log kept in process.
#[derive(Clone, Default)]
pub struct InMemorySalesReportRepository {
    reports: Arc<RwLock<Vec<SalesReport>>>,
}

impl InMemorySalesReportRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl SalesReportQuery for InMemorySalesReportRepository {
    async fn find_by_id(
        &self,
        id: &SalesReportId,
    ) -> error_stack::Result<Option<SalesReport>, KernelError> {
        let reports = self.reports.read().await;
        Ok(reports.iter().find(|report| report.id() == id).cloned())
    }

    async fn find_all(&self) -> error_stack::Result<Vec<SalesReport>, KernelError> {
        Ok(self.reports.read().await.iter().rev().cloned().collect())
    }
}

#[async_trait::async_trait]
impl SalesReportModifier for InMemorySalesReportRepository {
    async fn save(&self, report: &SalesReport) -> error_stack::Result<SalesReport, KernelError> {
        let mut reports = self.reports.write().await;
        let id = SalesReportId::from_raw(reports.len() as i32 + 1);
        let saved = report.clone().with_id(id);
        reports.push(saved.clone());
        Ok(saved)
    }
}
