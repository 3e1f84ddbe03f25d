use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use vodca::{AsRefln, Fromln, References};

use crate::entity::{BookId, BookPrice};

#[derive(
    Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize, Fromln,
    AsRefln,
)]
#[serde(transparent)]
pub struct ItemQuantity(i32);

impl ItemQuantity {
    pub fn new(quantity: impl Into<i32>) -> Self {
        Self(quantity.into())
    }

    pub fn is_positive(&self) -> bool {
        self.0 >= 1
    }
}

/// One line of an order, with the unit price captured when stock was reserved.
#[derive(Debug, Clone, Eq, PartialEq, Hash, References)]
pub struct OrderItem {
    book_id: BookId,
    quantity: ItemQuantity,
    unit_price: BookPrice,
}

impl OrderItem {
    pub fn new(book_id: BookId, quantity: ItemQuantity, unit_price: BookPrice) -> Self {
        Self {
            book_id,
            quantity,
            unit_price,
        }
    }

    pub fn subtotal(&self) -> Decimal {
        self.unit_price.times(&self.quantity)
    }
}
