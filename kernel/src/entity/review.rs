mod id;
mod rating;
mod text;

pub use self::{id::*, rating::*, text::*};
use crate::entity::common::{invalid, Entity, EntityId};
use crate::entity::{BookId, CreatedAt, CustomerId};
use crate::query::ReviewCriteria;
use crate::KernelError;
use destructure::{Destructure, Mutation};
use vodca::References;

/// A customer's rating of a book. Reviews feed the book's review aggregate
/// and are removed together with their book or customer.
#[derive(Debug, Clone, Eq, PartialEq, References, Destructure, Mutation)]
pub struct Review {
    id: ReviewId,
    book_id: BookId,
    customer_id: Option<CustomerId>,
    rating: ReviewRating,
    text: ReviewText,
    created_at: CreatedAt,
}

impl Review {
    pub fn new(
        id: ReviewId,
        book_id: BookId,
        customer_id: Option<CustomerId>,
        rating: ReviewRating,
        text: ReviewText,
        created_at: CreatedAt,
    ) -> Self {
        Self {
            id,
            book_id,
            customer_id,
            rating,
            text,
            created_at,
        }
    }
}

impl Entity for Review {
    type Id = ReviewId;
    type Criteria = ReviewCriteria;
    const KIND: &'static str = "review";

    fn entity_id(&self) -> Self::Id {
        self.id
    }

    fn with_id(self, id: Self::Id) -> Self {
        self.reconstruct(|r| r.id = id)
    }

    fn validate(&self) -> error_stack::Result<(), KernelError> {
        self.id.ensure_valid()?;
        if !self.rating.is_in_range() {
            return Err(invalid(
                Self::KIND,
                format!(
                    "rating {} is outside {}..={}",
                    self.rating.as_ref(),
                    ReviewRating::MIN,
                    ReviewRating::MAX
                ),
            ));
        }
        Ok(())
    }
}
