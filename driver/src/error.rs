use std::num::TryFromIntError;

use error_stack::Report;
use kernel::KernelError;

#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error(transparent)]
    SqlX(sqlx::Error),
    #[error(transparent)]
    Migrate(sqlx::migrate::MigrateError),
    #[error(transparent)]
    Env(dotenvy::Error),
    #[error(transparent)]
    Conversion(anyhow::Error),
}

impl From<sqlx::Error> for DriverError {
    fn from(value: sqlx::Error) -> Self {
        Self::SqlX(value)
    }
}

impl From<sqlx::migrate::MigrateError> for DriverError {
    fn from(value: sqlx::migrate::MigrateError) -> Self {
        Self::Migrate(value)
    }
}

impl From<dotenvy::Error> for DriverError {
    fn from(value: dotenvy::Error) -> Self {
        Self::Env(value)
    }
}

impl From<TryFromIntError> for DriverError {
    fn from(value: TryFromIntError) -> Self {
        Self::Conversion(anyhow::Error::new(value))
    }
}

impl From<DriverError> for Report<KernelError> {
    fn from(value: DriverError) -> Self {
        match value {
            DriverError::SqlX(error) => classify(error),
            other => Report::new(other).change_context(KernelError::Internal),
        }
    }
}

pub trait ConvertError {
    type Ok;
    fn convert_error(self) -> error_stack::Result<Self::Ok, KernelError>;
}

impl<T> ConvertError for Result<T, sqlx::Error> {
    type Ok = T;
    fn convert_error(self) -> error_stack::Result<T, KernelError> {
        self.map_err(classify)
    }
}

impl<T> ConvertError for Result<T, DriverError> {
    type Ok = T;
    fn convert_error(self) -> error_stack::Result<T, KernelError> {
        self.map_err(Report::from)
    }
}

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const CHECK_VIOLATION: &str = "23514";

fn classify(error: sqlx::Error) -> Report<KernelError> {
    let context = match &error {
        sqlx::Error::PoolTimedOut => KernelError::Timeout,
        sqlx::Error::RowNotFound => KernelError::NotFound,
        sqlx::Error::Database(db) => match db.code().as_deref() {
            Some(UNIQUE_VIOLATION) => KernelError::DuplicateId,
            Some(FOREIGN_KEY_VIOLATION) => KernelError::Conflict,
            Some(CHECK_VIOLATION) => KernelError::Validation,
            _ => KernelError::Internal,
        },
        _ => KernelError::Internal,
    };
    Report::from(error).change_context(context)
}
