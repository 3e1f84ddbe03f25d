use crate::controller::Intake;
use application::transfer::CreateReviewDto;
use kernel::prelude::entity::{BookId, CustomerId};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CreateRequest {
    book_id: i32,
    customer_id: Option<i32>,
    rating: i32,
    #[serde(default)]
    review_text: String,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub book_id: Option<i32>,
}

pub struct Transformer;

impl Intake<CreateRequest> for Transformer {
    type To = CreateReviewDto;
    fn emit(&self, input: CreateRequest) -> Self::To {
        CreateReviewDto {
            book_id: BookId::new(input.book_id),
            customer_id: input.customer_id.map(CustomerId::new),
            rating: input.rating,
            text: input.review_text,
        }
    }
}
