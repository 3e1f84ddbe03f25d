use rust_decimal::Decimal;
use serde::Deserialize;
use time::OffsetDateTime;

use crate::entity::{AuthorId, Book, BookId};
use crate::query::{any_of, within, Criteria};

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct BookCriteria {
    pub ids: Vec<BookId>,
    pub titles: Vec<String>,
    pub genres: Vec<String>,
    pub author_ids: Vec<AuthorId>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub min_published_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub max_published_at: Option<OffsetDateTime>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub min_stock: Option<i32>,
    pub max_stock: Option<i32>,
    pub min_average_rating: Option<Decimal>,
    pub max_average_rating: Option<Decimal>,
    pub min_review_count: Option<i32>,
    pub max_review_count: Option<i32>,
}

impl Criteria<Book> for BookCriteria {
    fn matches(&self, book: &Book) -> bool {
        // Books without reviews count as rating 0 with 0 reviews.
        let (rating, reviews) = book
            .review_stats()
            .map(|stats| (*stats.average_rating(), *stats.review_count()))
            .unwrap_or((Decimal::ZERO, 0));

        any_of(&self.ids, book.id())
            && any_of(&self.titles, book.title().as_ref())
            && (self.genres.is_empty() || book.genres().contains_any(&self.genres))
            && any_of(&self.author_ids, book.author_id())
            && within(
                self.min_published_at.as_ref(),
                self.max_published_at.as_ref(),
                book.published_at().as_ref(),
            )
            && within(
                self.min_price.as_ref(),
                self.max_price.as_ref(),
                book.price().as_ref(),
            )
            && within(
                self.min_stock.as_ref(),
                self.max_stock.as_ref(),
                book.stock().as_ref(),
            )
            && within(
                self.min_average_rating.as_ref(),
                self.max_average_rating.as_ref(),
                &rating,
            )
            && within(
                self.min_review_count.as_ref(),
                self.max_review_count.as_ref(),
                &reviews,
            )
    }
}

#[cfg(test)]
mod test {
    use rust_decimal::Decimal;
    use time::macros::datetime;

    use crate::entity::{
        AuthorId, Book, BookGenres, BookId, BookPrice, BookReviewAggregate, BookStock, BookTitle,
        CreatedAt, PublishedAt,
    };
    use crate::query::{BookCriteria, Criteria};

    fn book(stats: Option<BookReviewAggregate>) -> Book {
        Book::new(
            BookId::new(7),
            BookTitle::new("Dune"),
            AuthorId::new(1),
            BookGenres::new(["sf", "classic"]),
            PublishedAt::new(datetime!(1965-08-01 0:00 UTC)),
            BookPrice::new(Decimal::new(1299, 2)),
            BookStock::new(4),
            CreatedAt::now(),
            stats,
        )
    }

    #[test]
    fn empty_criteria_match_everything() {
        assert!(BookCriteria::default().matches(&book(None)));
    }

    #[test]
    fn filters_by_fields_and_ranges() {
        let book = book(Some(BookReviewAggregate::new(Decimal::new(45, 1), 2)));
        let criteria = BookCriteria {
            genres: vec!["sf".into()],
            min_price: Some(Decimal::TEN),
            max_stock: Some(4),
            min_average_rating: Some(Decimal::new(4, 0)),
            ..Default::default()
        };
        assert!(criteria.matches(&book));

        let criteria = BookCriteria {
            author_ids: vec![AuthorId::new(2)],
            ..Default::default()
        };
        assert!(!criteria.matches(&book));

        let criteria = BookCriteria {
            max_published_at: Some(datetime!(1960-01-01 0:00 UTC)),
            ..Default::default()
        };
        assert!(!criteria.matches(&book));
    }

    #[test]
    fn unreviewed_book_has_zero_rating() {
        let criteria = BookCriteria {
            min_review_count: Some(1),
            ..Default::default()
        };
        assert!(!criteria.matches(&book(None)));
    }
}
