use serde::{Deserialize, Serialize};
use vodca::{AsRefln, Fromln};

use crate::entity::ItemQuantity;

#[derive(
    Debug, Clone, Copy, Default, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize,
    Fromln, AsRefln,
)]
#[serde(transparent)]
pub struct BookStock(i32);

impl BookStock {
    pub fn new(stock: impl Into<i32>) -> Self {
        Self(stock.into())
    }

    /// A book with no stock supplies nothing, whatever the requested quantity.
    pub fn can_supply(&self, quantity: &ItemQuantity) -> bool {
        self.0 > 0 && *quantity.as_ref() <= self.0
    }

    pub fn take(&self, quantity: &ItemQuantity) -> Option<Self> {
        self.can_supply(quantity)
            .then(|| Self(self.0 - quantity.as_ref()))
    }

    pub fn restore(&self, quantity: &ItemQuantity) -> Self {
        Self(self.0.saturating_add(*quantity.as_ref()))
    }
}
