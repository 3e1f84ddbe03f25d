use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use vodca::References;

use crate::entity::{BookId, BookPrice, BookTitle};

/// Book details captured when the report was generated. The title is absent
/// when the book no longer exists.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize, References)]
pub struct BookSnapshot {
    id: BookId,
    title: Option<BookTitle>,
    price: Option<BookPrice>,
}

impl BookSnapshot {
    pub fn new(id: BookId, title: Option<BookTitle>, price: Option<BookPrice>) -> Self {
        Self { id, title, price }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize, References)]
pub struct TopSellingBook {
    book: BookSnapshot,
    quantity_sold: i32,
    revenue: Decimal,
}

impl TopSellingBook {
    pub fn new(book: BookSnapshot, quantity_sold: i32, revenue: impl Into<Decimal>) -> Self {
        Self {
            book,
            quantity_sold,
            revenue: revenue.into(),
        }
    }
}
