use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use vodca::{AsRefln, Fromln};

use crate::entity::ItemQuantity;

#[derive(
    Debug, Clone, Copy, Default, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize,
    Fromln, AsRefln,
)]
#[serde(transparent)]
pub struct BookPrice(Decimal);

impl BookPrice {
    pub fn new(price: impl Into<Decimal>) -> Self {
        Self(price.into())
    }

    pub fn times(&self, quantity: &ItemQuantity) -> Decimal {
        self.0 * Decimal::from(*quantity.as_ref())
    }
}
