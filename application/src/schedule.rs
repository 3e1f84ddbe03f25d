use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::service::SalesReportService;
use crate::transfer::SalesReportConfig;

/// Generates a sales report every `config.interval` until `shutdown` fires.
/// The first report is produced one interval after start. A failed run is
/// logged and the timer keeps going.
pub async fn run_sales_report_schedule<M: SalesReportService>(
    module: Arc<M>,
    config: SalesReportConfig,
    shutdown: CancellationToken,
) {
    let period = config.interval.unsigned_abs().max(Duration::from_secs(1));
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticker.tick().await;
    tracing::info!(?period, "sales report schedule started");

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = shutdown.cancelled() => {
                tracing::info!("sales report schedule stopped");
                return;
            }
        }
        match module.generate_sales_report(&config, &shutdown).await {
            Ok(Some(_)) => {}
            Ok(None) => tracing::info!("sales report run interrupted by shutdown"),
            Err(report) => tracing::error!("sales report run failed: {report:?}"),
        }
    }
}
