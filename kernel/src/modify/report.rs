use crate::entity::SalesReport;
use crate::query::SalesReportQuery;
use crate::KernelError;

#[async_trait::async_trait]
pub trait SalesReportModifier: 'static + Sync + Send {
    /// Appends the report with its top-selling rows and returns it with its id.
    async fn save(&self, report: &SalesReport) -> error_stack::Result<SalesReport, KernelError>;
}

pub trait SalesReportRepository: SalesReportQuery + SalesReportModifier {}

impl<T> SalesReportRepository for T where T: SalesReportQuery + SalesReportModifier {}

pub trait DependOnSalesReportRepository: 'static + Sync + Send {
    type SalesReportRepository: SalesReportRepository;
    fn sales_report_repository(&self) -> &Self::SalesReportRepository;
}
