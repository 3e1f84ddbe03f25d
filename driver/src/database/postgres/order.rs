use std::collections::HashMap;

use error_stack::Report;
use rust_decimal::Decimal;
use sqlx::PgConnection;
use time::OffsetDateTime;

use kernel::interface::database::DatabaseConnection;
use kernel::interface::query::{Criteria, EntityQuery, OrderCriteria};
use kernel::interface::update::EntityModifier;
use kernel::prelude::entity::{
    BookId, BookPrice, CreatedAt, CustomerId, Entity, EntityId, ItemQuantity, Order, OrderId,
    OrderItem, OrderStatus, OrderTotal,
};
use kernel::KernelError;

use crate::database::postgres::{sync_sequence, PostgresDatabase};
use crate::error::ConvertError;

pub struct PostgresOrderRepository {
    db: PostgresDatabase,
}

impl PostgresOrderRepository {
    pub fn new(db: PostgresDatabase) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl EntityQuery<Order> for PostgresOrderRepository {
    async fn find_by_id(&self, id: &OrderId) -> error_stack::Result<Option<Order>, KernelError> {
        let mut con = self.db.acquire().await?;
        PgOrderInternal::find_by_id(&mut con, id).await
    }

    async fn find_all(&self) -> error_stack::Result<Vec<Order>, KernelError> {
        let mut con = self.db.acquire().await?;
        PgOrderInternal::find_all(&mut con).await
    }

    async fn search(
        &self,
        criteria: &OrderCriteria,
    ) -> error_stack::Result<Vec<Order>, KernelError> {
        let orders = self.find_all().await?;
        Ok(orders
            .into_iter()
            .filter(|order| criteria.matches(order))
            .collect())
    }
}

#[async_trait::async_trait]
impl EntityModifier<Order> for PostgresOrderRepository {
    async fn create(&self, order: &Order) -> error_stack::Result<Order, KernelError> {
        order.validate()?;
        let mut transaction = self.db.transact().await?;
        let created = PgOrderInternal::create(&mut transaction, order).await;
        transaction.finish(created).await
    }

    async fn update(&self, id: &OrderId, order: &Order) -> error_stack::Result<Order, KernelError> {
        let order = order.clone().with_id(*id);
        order.validate()?;
        let mut transaction = self.db.transact().await?;
        let updated = PgOrderInternal::update(&mut transaction, &order).await;
        transaction.finish(updated).await
    }

    async fn delete(&self, id: &OrderId) -> error_stack::Result<(), KernelError> {
        let mut con = self.db.acquire().await?;
        PgOrderInternal::delete(&mut con, id).await
    }
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i32,
    customer_id: i32,
    total_price: Decimal,
    status: String,
    created_at: OffsetDateTime,
}

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    order_id: i32,
    book_id: i32,
    quantity: i32,
    unit_price: Decimal,
}

impl From<OrderItemRow> for OrderItem {
    fn from(value: OrderItemRow) -> Self {
        OrderItem::new(
            BookId::new(value.book_id),
            ItemQuantity::new(value.quantity),
            BookPrice::new(value.unit_price),
        )
    }
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> error_stack::Result<Order, KernelError> {
        Ok(Order::new(
            OrderId::new(self.id),
            CustomerId::new(self.customer_id),
            items,
            OrderTotal::new(self.total_price),
            OrderStatus::try_from(self.status.as_str())?,
            CreatedAt::new(self.created_at),
        ))
    }
}

pub(in crate::database) struct PgOrderInternal;

impl PgOrderInternal {
    async fn find_by_id(
        con: &mut PgConnection,
        id: &OrderId,
    ) -> error_stack::Result<Option<Order>, KernelError> {
        let row = sqlx::query_as::<_, OrderRow>(
            // language=postgresql
            r#"
            SELECT id, customer_id, total_price, status, created_at
            FROM orders
            WHERE id = $1
            "#,
        )
        .bind(id.as_ref())
        .fetch_optional(&mut *con)
        .await
        .convert_error()?;
        let Some(row) = row else {
            return Ok(None);
        };
        let items = sqlx::query_as::<_, OrderItemRow>(
            // language=postgresql
            r#"
            SELECT order_id, book_id, quantity, unit_price
            FROM order_items
            WHERE order_id = $1
            ORDER BY id
            "#,
        )
        .bind(id.as_ref())
        .fetch_all(&mut *con)
        .await
        .convert_error()?;
        let items = items.into_iter().map(OrderItem::from).collect();
        row.into_order(items).map(Some)
    }

    async fn find_all(con: &mut PgConnection) -> error_stack::Result<Vec<Order>, KernelError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            // language=postgresql
            r#"
            SELECT id, customer_id, total_price, status, created_at
            FROM orders
            ORDER BY id
            "#,
        )
        .fetch_all(&mut *con)
        .await
        .convert_error()?;
        let item_rows = sqlx::query_as::<_, OrderItemRow>(
            // language=postgresql
            r#"
            SELECT order_id, book_id, quantity, unit_price
            FROM order_items
            ORDER BY id
            "#,
        )
        .fetch_all(&mut *con)
        .await
        .convert_error()?;

        let mut items: HashMap<i32, Vec<OrderItem>> = HashMap::new();
        for row in item_rows {
            items.entry(row.order_id).or_default().push(row.into());
        }
        rows.into_iter()
            .map(|row| {
                let order_items = items.remove(&row.id).unwrap_or_default();
                row.into_order(order_items)
            })
            .collect()
    }

    async fn create(
        con: &mut PgConnection,
        order: &Order,
    ) -> error_stack::Result<Order, KernelError> {
        let explicit = order.id().is_assigned();
        let id: i32 = if explicit {
            sqlx::query_scalar(
                // language=postgresql
                r#"
                INSERT INTO orders (customer_id, total_price, status, created_at, id)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id
                "#,
            )
            .bind(order.customer_id().as_ref())
            .bind(order.total().as_ref())
            .bind(order.status().as_str())
            .bind(order.created_at().as_ref())
            .bind(order.id().as_ref())
        } else {
            sqlx::query_scalar(
                // language=postgresql
                r#"
                INSERT INTO orders (customer_id, total_price, status, created_at)
                VALUES ($1, $2, $3, $4)
                RETURNING id
                "#,
            )
            .bind(order.customer_id().as_ref())
            .bind(order.total().as_ref())
            .bind(order.status().as_str())
            .bind(order.created_at().as_ref())
        }
        .fetch_one(&mut *con)
        .await
        .convert_error()?;
        let id = OrderId::new(id);
        Self::insert_items(con, &id, order.items()).await?;
        if explicit {
            sync_sequence(con, "orders").await?;
        }
        Ok(order.clone().with_id(id))
    }

    async fn update(
        con: &mut PgConnection,
        order: &Order,
    ) -> error_stack::Result<Order, KernelError> {
        let updated: Option<i32> = sqlx::query_scalar(
            // language=postgresql
            r#"
            UPDATE orders
            SET customer_id = $2, total_price = $3, status = $4, created_at = $5
            WHERE id = $1
            RETURNING id
            "#,
        )
        .bind(order.id().as_ref())
        .bind(order.customer_id().as_ref())
        .bind(order.total().as_ref())
        .bind(order.status().as_str())
        .bind(order.created_at().as_ref())
        .fetch_optional(&mut *con)
        .await
        .convert_error()?;
        if updated.is_none() {
            return Err(Report::new(KernelError::NotFound)
                .attach_printable(format!("{} does not exist", order.id())));
        }

        // language=postgresql
        sqlx::query(
            r#"
            DELETE FROM order_items
            WHERE order_id = $1
            "#,
        )
        .bind(order.id().as_ref())
        .execute(&mut *con)
        .await
        .convert_error()?;
        Self::insert_items(con, order.id(), order.items()).await?;
        Ok(order.clone())
    }

    async fn insert_items(
        con: &mut PgConnection,
        id: &OrderId,
        items: &[OrderItem],
    ) -> error_stack::Result<(), KernelError> {
        for item in items {
            // language=postgresql
            sqlx::query(
                r#"
                INSERT INTO order_items (order_id, book_id, quantity, unit_price)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(id.as_ref())
            .bind(item.book_id().as_ref())
            .bind(item.quantity().as_ref())
            .bind(item.unit_price().as_ref())
            .execute(&mut *con)
            .await
            .convert_error()?;
        }
        Ok(())
    }

    async fn delete(con: &mut PgConnection, id: &OrderId) -> error_stack::Result<(), KernelError> {
        // Items go with the order through ON DELETE CASCADE.
        // language=postgresql
        let result = sqlx::query(
            r#"
            DELETE FROM orders
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
