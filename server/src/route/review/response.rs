use crate::controller::Exhaust;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use kernel::prelude::entity::{
    BookId, CreatedAt, CustomerId, DestructReview, Review, ReviewId, ReviewRating, ReviewText,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    id: ReviewId,
    book_id: BookId,
    customer_id: Option<CustomerId>,
    rating: ReviewRating,
    review_text: ReviewText,
    created_at: CreatedAt,
}

impl IntoResponse for ReviewResponse {
    fn into_response(self) -> axum::response::Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

impl From<Review> for ReviewResponse {
    fn from(review: Review) -> Self {
        let DestructReview {
            id,
            book_id,
            customer_id,
            rating,
            text,
            created_at,
        } = review.into_destruct();
        Self {
            id,
            book_id,
            customer_id,
            rating,
            review_text: text,
            created_at,
        }
    }
}

pub struct Presenter;

impl Exhaust<Review> for Presenter {
    type To = ReviewResponse;
    fn emit(&self, input: Review) -> Self::To {
        ReviewResponse::from(input)
    }
}

impl Exhaust<Vec<Review>> for Presenter {
    type To = Json<Vec<ReviewResponse>>;
    fn emit(&self, input: Vec<Review>) -> Self::To {
        Json(input.into_iter().map(ReviewResponse::from).collect())
    }
}

impl Exhaust<()> for Presenter {
    type To = StatusCode;
    fn emit(&self, _: ()) -> Self::To {
        StatusCode::NO_CONTENT
    }
}
