use crate::entity::{SalesReport, SalesReportId};
use crate::KernelError;

#[async_trait::async_trait]
pub trait SalesReportQuery: 'static + Sync + Send {
    async fn find_by_id(
        &self,
        id: &SalesReportId,
    ) -> error_stack::Result<Option<SalesReport>, KernelError>;
    /// Newest report first.
    async fn find_all(&self) -> error_stack::Result<Vec<SalesReport>, KernelError>;
}
