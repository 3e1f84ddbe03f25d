use rust_decimal::Decimal;
use time::OffsetDateTime;

use kernel::prelude::entity::{AuthorId, BookId};

#[derive(Debug, Clone)]
pub struct CreateBookDto {
    pub title: String,
    pub author_id: AuthorId,
    pub genres: Vec<String>,
    pub published_at: OffsetDateTime,
    pub price: Decimal,
    pub stock: i32,
}

#[derive(Debug, Clone)]
pub struct UpdateBookDto {
    pub id: BookId,
    pub title: String,
    pub author_id: AuthorId,
    pub genres: Vec<String>,
    pub published_at: OffsetDateTime,
    pub price: Decimal,
    pub stock: i32,
}
