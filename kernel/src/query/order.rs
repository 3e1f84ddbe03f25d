use rust_decimal::Decimal;
use serde::Deserialize;
use time::OffsetDateTime;

use crate::entity::{CustomerId, Order, OrderId, OrderStatus};
use crate::query::{any_of, within, Criteria};

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct OrderCriteria {
    pub ids: Vec<OrderId>,
    pub customer_ids: Vec<CustomerId>,
    pub min_total_price: Option<Decimal>,
    pub max_total_price: Option<Decimal>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub min_created_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub max_created_at: Option<OffsetDateTime>,
    pub status: Option<OrderStatus>,
    /// Matches when at least one item lies in the quantity range.
    pub min_item_quantity: Option<i32>,
    pub max_item_quantity: Option<i32>,
}

impl Criteria<Order> for OrderCriteria {
    fn matches(&self, order: &Order) -> bool {
        let item_filter = self.min_item_quantity.is_some() || self.max_item_quantity.is_some();
        any_of(&self.ids, order.id())
            && any_of(&self.customer_ids, order.customer_id())
            && within(
                self.min_total_price.as_ref(),
                self.max_total_price.as_ref(),
                order.total().as_ref(),
            )
            && within(
                self.min_created_at.as_ref(),
                self.max_created_at.as_ref(),
                order.created_at().as_ref(),
            )
            && self.status.map_or(true, |status| *order.status() == status)
            && (!item_filter
                || order.items().iter().any(|item| {
                    within(
                        self.min_item_quantity.as_ref(),
                        self.max_item_quantity.as_ref(),
                        item.quantity().as_ref(),
                    )
                }))
    }
}
