use serde::Deserialize;
use time::OffsetDateTime;

use crate::entity::{BookId, CustomerId, Review, ReviewId};
use crate::query::{any_of, within, Criteria};

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct ReviewCriteria {
    pub ids: Vec<ReviewId>,
    pub book_ids: Vec<BookId>,
    /// Anonymous reviews never match a non-empty list.
    pub customer_ids: Vec<CustomerId>,
    pub min_rating: Option<i32>,
    pub max_rating: Option<i32>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub min_created_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub max_created_at: Option<OffsetDateTime>,
}

impl ReviewCriteria {
    pub fn for_book(book_id: BookId) -> Self {
        Self {
            book_ids: vec![book_id],
            ..Default::default()
        }
    }
}

impl Criteria<Review> for ReviewCriteria {
    fn matches(&self, review: &Review) -> bool {
        let customer = self.customer_ids.is_empty()
            || review
                .customer_id()
                .is_some_and(|id| self.customer_ids.contains(&id));
        any_of(&self.ids, review.id())
            && any_of(&self.book_ids, review.book_id())
            && customer
            && within(
                self.min_rating.as_ref(),
                self.max_rating.as_ref(),
                review.rating().as_ref(),
            )
            && within(
                self.min_created_at.as_ref(),
                self.max_created_at.as_ref(),
                review.created_at().as_ref(),
            )
    }
}

#[cfg(test)]
mod test {
    use time::macros::datetime;

    use crate::entity::{BookId, CreatedAt, CustomerId, Review, ReviewId, ReviewRating, ReviewText};
    use crate::query::{Criteria, ReviewCriteria};

    fn review(book: i32, customer: Option<i32>, rating: i32) -> Review {
        Review::new(
            ReviewId::new(1),
            BookId::new(book),
            customer.map(CustomerId::new),
            ReviewRating::new(rating),
            ReviewText::default(),
            CreatedAt::new(datetime!(2024-03-01 10:00 UTC)),
        )
    }

    #[test]
    fn filters_by_book_customer_and_rating() {
        let criteria = ReviewCriteria {
            customer_ids: vec![CustomerId::new(7)],
            min_rating: Some(3),
            ..ReviewCriteria::for_book(BookId::new(2))
        };
        assert!(criteria.matches(&review(2, Some(7), 4)));
        assert!(!criteria.matches(&review(3, Some(7), 4)));
        assert!(!criteria.matches(&review(2, None, 4)));
        assert!(!criteria.matches(&review(2, Some(7), 2)));
        assert!(ReviewCriteria::default().matches(&review(9, None, 1)));
    }
}
