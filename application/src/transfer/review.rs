use kernel::prelude::entity::{BookId, CustomerId};

#[derive(Debug, Clone)]
pub struct CreateReviewDto {
    pub book_id: BookId,
    pub customer_id: Option<CustomerId>,
    pub rating: i32,
    pub text: String,
}
