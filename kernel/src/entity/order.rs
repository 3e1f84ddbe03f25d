mod id;
mod item;
mod status;
mod total;

pub use self::{id::*, item::*, status::*, total::*};
use crate::entity::common::{invalid, CreatedAt, Entity, EntityId};
use crate::entity::{BookId, CustomerId};
use crate::query::OrderCriteria;
use crate::KernelError;
use destructure::{Destructure, Mutation};
use rust_decimal::Decimal;
use vodca::References;

#[derive(Debug, Clone, Eq, PartialEq, References, Destructure, Mutation)]
pub struct Order {
    id: OrderId,
    customer_id: CustomerId,
    items: Vec<OrderItem>,
    total: OrderTotal,
    status: OrderStatus,
    created_at: CreatedAt,
}

impl Order {
    pub fn new(
        id: OrderId,
        customer_id: CustomerId,
        items: Vec<OrderItem>,
        total: OrderTotal,
        status: OrderStatus,
        created_at: CreatedAt,
    ) -> Self {
        Self {
            id,
            customer_id,
            items,
            total,
            status,
            created_at,
        }
    }

    /// Builds an order whose total is the sum of its item subtotals.
    pub fn place(
        id: OrderId,
        customer_id: CustomerId,
        items: Vec<OrderItem>,
        status: OrderStatus,
        created_at: CreatedAt,
    ) -> Self {
        let total = OrderTotal::sum(&items);
        Self::new(id, customer_id, items, total, status, created_at)
    }

    pub fn references_book(&self, book_id: &BookId) -> bool {
        self.items.iter().any(|item| item.book_id() == book_id)
    }

    pub fn is_settled(&self) -> bool {
        self.status == OrderStatus::Success
    }
}

impl Entity for Order {
    type Id = OrderId;
    type Criteria = OrderCriteria;
    const KIND: &'static str = "order";

    fn entity_id(&self) -> Self::Id {
        self.id
    }

    fn with_id(self, id: Self::Id) -> Self {
        self.reconstruct(|o| o.id = id)
    }

    fn validate(&self) -> error_stack::Result<(), KernelError> {
        self.id.ensure_valid()?;
        if self.items.is_empty() {
            return Err(invalid(Self::KIND, "an order needs at least one item"));
        }
        if let Some(item) = self.items.iter().find(|item| !item.quantity().is_positive()) {
            return Err(invalid(
                Self::KIND,
                format!("quantity {:?} of {} is below 1", item.quantity(), item.book_id()),
            ));
        }
        if *self.total.as_ref() < Decimal::ZERO {
            return Err(invalid(Self::KIND, "negative total"));
        }
        Ok(())
    }
}
