use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use vodca::References;

/// Review summary supplied by the authoritative store. Never computed by the core.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize, References)]
pub struct BookReviewAggregate {
    average_rating: Decimal,
    review_count: i32,
}

impl BookReviewAggregate {
    pub fn new(average_rating: impl Into<Decimal>, review_count: impl Into<i32>) -> Self {
        Self {
            average_rating: average_rating.into(),
            review_count: review_count.into(),
        }
    }
}
