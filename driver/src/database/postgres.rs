use std::ops::{Deref, DerefMut};

use sqlx::pool::PoolConnection;
use sqlx::{PgConnection, Pool, Postgres};

use kernel::interface::database::{DatabaseConnection, Transaction};
use kernel::KernelError;

use crate::env;
use crate::error::{ConvertError, DriverError};

pub use self::{author::*, book::*, customer::*, order::*, report::*, review::*};

mod author;
mod book;
mod customer;
mod order;
mod report;
mod review;

static POSTGRES_URL: &str = "POSTGRES_URL";

#[derive(Clone)]
pub struct PostgresDatabase {
    pool: Pool<Postgres>,
}

impl PostgresDatabase {
    pub async fn new() -> error_stack::Result<Self, KernelError> {
        let url = env(POSTGRES_URL)?;
        let pool = Pool::connect(&url).await.convert_error()?;
        Ok(Self { pool })
    }

    #[tracing::instrument(skip_all)]
    pub async fn migrate(&self) -> error_stack::Result<(), KernelError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(DriverError::from)?;
        tracing::info!("schema is up to date");
        Ok(())
    }

    pub(in crate::database) async fn acquire(
        &self,
    ) -> error_stack::Result<PoolConnection<Postgres>, KernelError> {
        self.pool.acquire().await.convert_error()
    }
}

pub struct PostgresTransaction(sqlx::Transaction<'static, Postgres>);

impl Deref for PostgresTransaction {
    type Target = PgConnection;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for PostgresTransaction {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

#[async_trait::async_trait]
impl Transaction for PostgresTransaction {
    async fn commit(self) -> error_stack::Result<(), KernelError> {
        self.0.commit().await.convert_error()
    }

    async fn roll_back(self) -> error_stack::Result<(), KernelError> {
        self.0.rollback().await.convert_error()
    }
}

impl PostgresTransaction {
    /// Commits when the work succeeded. Otherwise rolls back and returns the
    /// original failure, with any rollback failure attached.
    pub(in crate::database) async fn finish<T>(
        self,
        result: error_stack::Result<T, KernelError>,
    ) -> error_stack::Result<T, KernelError> {
        match result {
            Ok(value) => {
                self.commit().await?;
                Ok(value)
            }
            Err(mut report) => {
                if let Err(failure) = self.roll_back().await {
                    report.extend_one(failure);
                }
                Err(report)
            }
        }
    }
}

#[async_trait::async_trait]
impl DatabaseConnection for PostgresDatabase {
    type Transaction = PostgresTransaction;
    async fn transact(&self) -> error_stack::Result<PostgresTransaction, KernelError> {
        let transaction = self.pool.begin().await.convert_error()?;
        Ok(PostgresTransaction(transaction))
    }
}

/// Moves a `SERIAL` sequence past ids that were inserted explicitly.
pub(in crate::database) async fn sync_sequence(
    con: &mut PgConnection,
    table: &str,
) -> error_stack::Result<(), KernelError> {
    // language=postgresql
    let statement = format!(
        "SELECT setval(pg_get_serial_sequence('{table}', 'id'), GREATEST((SELECT MAX(id) FROM {table}), 1))"
    );
    sqlx::query(&statement)
        .execute(&mut *con)
        .await
        .convert_error()?;
    Ok(())
}
