use error_stack::Report;
use sqlx::PgConnection;
use time::OffsetDateTime;

use kernel::interface::query::{Criteria, CustomerCriteria, EntityQuery};
use kernel::interface::update::EntityModifier;
use kernel::prelude::entity::{
    Address, CreatedAt, Customer, CustomerEmail, CustomerId, CustomerName, CustomerPassword,
    CustomerRole, CustomerUsername, Entity, EntityId,
};
use kernel::KernelError;

use crate::database::postgres::{sync_sequence, PostgresDatabase};
use crate::error::ConvertError;

pub struct PostgresCustomerRepository {
    db: PostgresDatabase,
}

impl PostgresCustomerRepository {
    pub fn new(db: PostgresDatabase) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl EntityQuery<Customer> for PostgresCustomerRepository {
    async fn find_by_id(
        &self,
        id: &CustomerId,
    ) -> error_stack::Result<Option<Customer>, KernelError> {
        let mut con = self.db.acquire().await?;
        PgCustomerInternal::find_by_id(&mut con, id).await
    }

    async fn find_all(&self) -> error_stack::Result<Vec<Customer>, KernelError> {
        let mut con = self.db.acquire().await?;
        PgCustomerInternal::find_all(&mut con).await
    }

    async fn search(
        &self,
        criteria: &CustomerCriteria,
    ) -> error_stack::Result<Vec<Customer>, KernelError> {
        let customers = self.find_all().await?;
        Ok(customers
            .into_iter()
            .filter(|customer| criteria.matches(customer))
            .collect())
    }
}

#[async_trait::async_trait]
impl EntityModifier<Customer> for PostgresCustomerRepository {
    async fn create(&self, customer: &Customer) -> error_stack::Result<Customer, KernelError> {
        customer.validate()?;
        let mut con = self.db.acquire().await?;
        PgCustomerInternal::create(&mut con, customer).await
    }

    async fn update(
        &self,
        id: &CustomerId,
        customer: &Customer,
    ) -> error_stack::Result<Customer, KernelError> {
        let customer = customer.clone().with_id(*id);
        customer.validate()?;
        let mut con = self.db.acquire().await?;
        PgCustomerInternal::update(&mut con, &customer).await
    }

    async fn delete(&self, id: &CustomerId) -> error_stack::Result<(), KernelError> {
        let mut con = self.db.acquire().await?;
        PgCustomerInternal::delete(&mut con, id).await
    }
}

#[derive(sqlx::FromRow)]
struct CustomerRow {
    id: i32,
    name: String,
    username: String,
    email: String,
    password: String,
    street: String,
    city: String,
    state: String,
    postal_code: String,
    country: String,
    role: String,
    created_at: OffsetDateTime,
}

impl TryFrom<CustomerRow> for Customer {
    type Error = Report<KernelError>;
    fn try_from(value: CustomerRow) -> Result<Self, Self::Error> {
        Ok(Customer::new(
            CustomerId::new(value.id),
            CustomerName::new(value.name),
            CustomerUsername::new(value.username),
            CustomerEmail::new(value.email),
            CustomerPassword::new(value.password),
            Address::new(
                value.street,
                value.city,
                value.state,
                value.postal_code,
                value.country,
            ),
            CustomerRole::try_from(value.role.as_str())?,
            CreatedAt::new(value.created_at),
        ))
    }
}

const COLUMNS: &str =
    "id, name, username, email, password, street, city, state, postal_code, country, role, created_at";

pub(in crate::database) struct PgCustomerInternal;

impl PgCustomerInternal {
    async fn find_by_id(
        con: &mut PgConnection,
        id: &CustomerId,
    ) -> error_stack::Result<Option<Customer>, KernelError> {
        // language=postgresql
        let statement = format!("SELECT {COLUMNS} FROM customers WHERE id = $1");
        let row = sqlx::query_as::<_, CustomerRow>(&statement)
            .bind(id.as_ref())
            .fetch_optional(con)
            .await
            .convert_error()?;
        row.map(Customer::try_from).transpose()
    }

    async fn find_all(con: &mut PgConnection) -> error_stack::Result<Vec<Customer>, KernelError> {
        // language=postgresql
        let statement = format!("SELECT {COLUMNS} FROM customers ORDER BY id");
        let rows = sqlx::query_as::<_, CustomerRow>(&statement)
            .fetch_all(con)
            .await
            .convert_error()?;
        rows.into_iter().map(Customer::try_from).collect()
    }

    async fn create(
        con: &mut PgConnection,
        customer: &Customer,
    ) -> error_stack::Result<Customer, KernelError> {
        let explicit = customer.id().is_assigned();
        let address = customer.address();
        let statement = if explicit {
            // language=postgresql
            format!(
                r#"
                INSERT INTO customers (name, username, email, password, street, city, state, postal_code, country, role, created_at, id)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
                RETURNING {COLUMNS}
                "#
            )
        } else {
            // language=postgresql
            format!(
                r#"
                INSERT INTO customers (name, username, email, password, street, city, state, postal_code, country, role, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                RETURNING {COLUMNS}
                "#
            )
        };
        let mut query = sqlx::query_as::<_, CustomerRow>(&statement)
            .bind(customer.name().as_ref())
            .bind(customer.username().as_ref())
            .bind(customer.email().as_ref())
            .bind(customer.password().as_ref())
            .bind(address.street())
            .bind(address.city())
            .bind(address.state())
            .bind(address.postal_code())
            .bind(address.country())
            .bind(customer.role().as_str())
            .bind(customer.created_at().as_ref());
        if explicit {
            query = query.bind(customer.id().as_ref());
        }
        let row = query.fetch_one(&mut *con).await.convert_error()?;
        if explicit {
            sync_sequence(con, "customers").await?;
        }
        Customer::try_from(row)
    }

    async fn update(
        con: &mut PgConnection,
        customer: &Customer,
    ) -> error_stack::Result<Customer, KernelError> {
        let address = customer.address();
        // language=postgresql
        let statement = format!(
            r#"
            UPDATE customers
            SET name = $2, username = $3, email = $4, password = $5, street = $6, city = $7,
                state = $8, postal_code = $9, country = $10, role = $11
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, CustomerRow>(&statement)
            .bind(customer.id().as_ref())
            .bind(customer.name().as_ref())
            .bind(customer.username().as_ref())
            .bind(customer.email().as_ref())
            .bind(customer.password().as_ref())
            .bind(address.street())
            .bind(address.city())
            .bind(address.state())
            .bind(address.postal_code())
            .bind(address.country())
            .bind(customer.role().as_str())
            .fetch_optional(con)
            .await
            .convert_error()?;
        match row {
            Some(row) => Customer::try_from(row),
            None => Err(Report::new(KernelError::NotFound)
                .attach_printable(format!("{} does not exist", customer.id()))),
        }
    }

    async fn delete(
        con: &mut PgConnection,
        id: &CustomerId,
    ) -> error_stack::Result<(), KernelError> {
        // language=postgresql
        let result = sqlx::query(
            r#"
            DELETE FROM customers
            WHERE id = $1
            "#,
        )
        .bind(id.as_ref())
        .execute(con)
        .await
        .convert_error()?;
        if result.rows_affected() == 0 {
            return Err(Report::new(KernelError::NotFound)
                .attach_printable(format!("{id} does not exist")));
        }
        Ok(())
    }
}
