use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use vodca::{AsRefln, Fromln};

use crate::entity::OrderItem;

#[derive(
    Debug, Clone, Copy, Default, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize,
    Fromln, AsRefln,
)]
#[serde(transparent)]
pub struct OrderTotal(Decimal);

impl OrderTotal {
    pub fn new(total: impl Into<Decimal>) -> Self {
        Self(total.into())
    }

    pub fn sum<'a>(items: impl IntoIterator<Item = &'a OrderItem>) -> Self {
        Self(items.into_iter().map(OrderItem::subtotal).sum())
    }
}
