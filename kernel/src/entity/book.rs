mod genre;
mod id;
mod price;
mod published_at;
mod review;
mod stock;
mod title;

pub use self::{genre::*, id::*, price::*, published_at::*, review::*, stock::*, title::*};
use crate::entity::common::{invalid, CreatedAt, Entity, EntityId};
use crate::entity::AuthorId;
use crate::query::BookCriteria;
use crate::KernelError;
use destructure::{Destructure, Mutation};
use rust_decimal::Decimal;
use vodca::References;

#[derive(Debug, Clone, Eq, PartialEq, References, Destructure, Mutation)]
pub struct Book {
    id: BookId,
    title: BookTitle,
    author_id: AuthorId,
    genres: BookGenres,
    published_at: PublishedAt,
    price: BookPrice,
    stock: BookStock,
    created_at: CreatedAt,
    review_stats: Option<BookReviewAggregate>,
}

impl Book {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: BookId,
        title: BookTitle,
        author_id: AuthorId,
        genres: BookGenres,
        published_at: PublishedAt,
        price: BookPrice,
        stock: BookStock,
        created_at: CreatedAt,
        review_stats: Option<BookReviewAggregate>,
    ) -> Self {
        Self {
            id,
            title,
            author_id,
            genres,
            published_at,
            price,
            stock,
            created_at,
            review_stats,
        }
    }
}

impl Entity for Book {
    type Id = BookId;
    type Criteria = BookCriteria;
    const KIND: &'static str = "book";

    fn entity_id(&self) -> Self::Id {
        self.id
    }

    fn with_id(self, id: Self::Id) -> Self {
        self.reconstruct(|b| b.id = id)
    }

    fn validate(&self) -> error_stack::Result<(), KernelError> {
        self.id.ensure_valid()?;
        if self.title.as_ref().trim().is_empty() {
            return Err(invalid(Self::KIND, "title is required"));
        }
        if *self.stock.as_ref() < 0 {
            return Err(invalid(Self::KIND, format!("negative stock {:?}", self.stock)));
        }
        if *self.price.as_ref() < Decimal::ZERO {
            return Err(invalid(Self::KIND, format!("negative price {:?}", self.price)));
        }
        Ok(())
    }
}
