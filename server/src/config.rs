use std::str::FromStr;

use application::transfer::SalesReportConfig;
use error_stack::Report;
use kernel::KernelError;
use time::Duration;

static SERVER_PORT: &str = "SERVER_PORT";
static SALES_REPORT_INTERVAL_SECS: &str = "SALES_REPORT_INTERVAL_SECS";
static SALES_REPORT_WINDOW_SECS: &str = "SALES_REPORT_WINDOW_SECS";
static SALES_REPORT_OFFSET_SECS: &str = "SALES_REPORT_OFFSET_SECS";

#[derive(Debug, Clone, Copy)]
pub struct ServerConfig {
    pub port: u16,
    pub sales_report: SalesReportConfig,
}

impl ServerConfig {
    pub fn load() -> error_stack::Result<Self, KernelError> {
        let defaults = SalesReportConfig::default();
        let sales_report = SalesReportConfig {
            interval: seconds(SALES_REPORT_INTERVAL_SECS, defaults.interval)?,
            window: seconds(SALES_REPORT_WINDOW_SECS, defaults.window)?,
            created_at_offset: seconds(SALES_REPORT_OFFSET_SECS, defaults.created_at_offset)?,
            ..defaults
        };
        Ok(Self {
            port: parsed(SERVER_PORT, 8080)?,
            sales_report,
        })
    }
}

fn parsed<T: FromStr>(key: &str, default: T) -> error_stack::Result<T, KernelError> {
    match dotenvy::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|_| {
            Report::new(KernelError::Internal).attach_printable(format!("{key}={raw} is not valid"))
        }),
        Err(dotenvy::Error::EnvVar(std::env::VarError::NotPresent)) => Ok(default),
        Err(e) => Err(Report::new(KernelError::Internal)
            .attach_printable(format!("Failed to read {key}: {e}"))),
    }
}

fn seconds(key: &str, default: Duration) -> error_stack::Result<Duration, KernelError> {
    parsed(key, default.whole_seconds()).map(Duration::seconds)
}
