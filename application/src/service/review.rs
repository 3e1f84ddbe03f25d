use std::cmp::Reverse;

use error_stack::Report;

use kernel::interface::query::{EntityQuery, ReviewCriteria};
use kernel::interface::update::{DependOnReviewRepository, EntityModifier};
use kernel::prelude::entity::{
    BookId, CreatedAt, Entity, Review, ReviewId, ReviewRating, ReviewText,
};
use kernel::KernelError;

use crate::store::{DependOnBookStore, DependOnCustomerStore};
use crate::transfer::CreateReviewDto;

#[async_trait::async_trait]
pub trait GetReviewService:
    'static + Sync + Send + DependOnReviewRepository + DependOnBookStore
{
    /// Reviews of one book, newest first.
    async fn get_reviews_by_book(
        &self,
        book_id: &BookId,
    ) -> error_stack::Result<Vec<Review>, KernelError> {
        self.book_store().get(book_id).await?;
        let mut reviews = self
            .review_repository()
            .search(&ReviewCriteria::for_book(*book_id))
            .await?;
        reviews.sort_by_key(|review| Reverse((*review.created_at(), *review.id())));
        Ok(reviews)
    }

    async fn search_reviews(
        &self,
        criteria: &ReviewCriteria,
    ) -> error_stack::Result<Vec<Review>, KernelError> {
        self.review_repository().search(criteria).await
    }
}

impl<T> GetReviewService for T where T: DependOnReviewRepository + DependOnBookStore {}

#[async_trait::async_trait]
pub trait CreateReviewService:
    'static + Sync + Send + DependOnReviewRepository + DependOnBookStore + DependOnCustomerStore
{
    async fn create_review(
        &self,
        dto: CreateReviewDto,
    ) -> error_stack::Result<Review, KernelError> {
        self.book_store().get(&dto.book_id).await?;
        if let Some(customer_id) = &dto.customer_id {
            self.customer_store().get(customer_id).await?;
        }
        let review = Review::new(
            ReviewId::new(0),
            dto.book_id,
            dto.customer_id,
            ReviewRating::new(dto.rating),
            ReviewText::new(dto.text),
            CreatedAt::now(),
        );
        let created = self.review_repository().create(&review).await?;
        self.book_store().refresh(&dto.book_id).await;
        tracing::info!(review = %created.entity_id(), book = %dto.book_id, "review created");
        Ok(created)
    }
}

impl<T> CreateReviewService for T where
    T: DependOnReviewRepository + DependOnBookStore + DependOnCustomerStore
{
}

#[async_trait::async_trait]
pub trait DeleteReviewService:
    'static + Sync + Send + DependOnReviewRepository + DependOnBookStore
{
    async fn delete_review(&self, id: &ReviewId) -> error_stack::Result<(), KernelError> {
        let review = self.review_repository().find_by_id(id).await?.ok_or_else(|| {
            Report::new(KernelError::NotFound).attach_printable(format!("{id} does not exist"))
        })?;
        self.review_repository().delete(id).await?;
        self.book_store().refresh(review.book_id()).await;
        tracing::info!(review = %id, "review deleted");
        Ok(())
    }
}

impl<T> DeleteReviewService for T where T: DependOnReviewRepository + DependOnBookStore {}

#[cfg(test)]
mod test {
    use rust_decimal::Decimal;

    use kernel::interface::query::EntityQuery;
    use kernel::interface::update::EntityModifier;
    use kernel::prelude::entity::{BookId, BookReviewAggregate, CustomerId, ReviewId};
    use kernel::KernelError;

    use crate::fixture::{book, customer, TestModule};
    use crate::service::{CreateReviewService, DeleteReviewService, GetReviewService};
    use crate::store::{DependOnBookStore, DependOnCustomerStore};
    use crate::transfer::CreateReviewDto;

    fn review(book_id: BookId, rating: i32) -> CreateReviewDto {
        CreateReviewDto {
            book_id,
            customer_id: None,
            rating,
            text: "a slow start".into(),
        }
    }

    #[tokio::test]
    async fn lists_reviews_newest_first() {
        let module = TestModule::new();
        let book = module.book_store().create(&book(1, 1)).await.unwrap();
        let first = module.create_review(review(*book.id(), 3)).await.unwrap();
        let second = module.create_review(review(*book.id(), 5)).await.unwrap();

        let listed = module.get_reviews_by_book(book.id()).await.unwrap();
        assert_eq!(listed, vec![second, first]);

        let unknown = module.get_reviews_by_book(&BookId::new(404)).await;
        assert!(matches!(
            unknown.map_err(|e| *e.current_context()),
            Err(KernelError::NotFound)
        ));
    }

    #[tokio::test]
    async fn rejects_unknown_references_and_bad_ratings() {
        let module = TestModule::new();
        let book = module.book_store().create(&book(1, 1)).await.unwrap();
        let reader = module
            .customer_store()
            .create(&customer("critic@example.com"))
            .await
            .unwrap();

        let cases = [
            (review(BookId::new(404), 4), KernelError::NotFound),
            (
                CreateReviewDto {
                    customer_id: Some(CustomerId::new(404)),
                    ..review(*book.id(), 4)
                },
                KernelError::NotFound,
            ),
            (review(*book.id(), 6), KernelError::Validation),
            (review(*book.id(), 0), KernelError::Validation),
        ];
        for (dto, expected) in cases {
            let result = module.create_review(dto).await;
            assert_eq!(result.map_err(|e| *e.current_context()).err(), Some(expected));
        }

        let signed = module
            .create_review(CreateReviewDto {
                customer_id: Some(*reader.id()),
                ..review(*book.id(), 4)
            })
            .await
            .unwrap();
        assert_eq!(signed.customer_id(), &Some(*reader.id()));
    }

    #[tokio::test]
    async fn review_changes_refresh_cached_book() {
        let module = TestModule::new();
        let store = module.book_store();
        let created = store.create(&book(1, 1)).await.unwrap();
        let id = *created.id();

        // The authority derives the aggregate; stand in for it here.
        let aggregate = BookReviewAggregate::new(Decimal::new(400, 2), 1);
        let rated = created.reconstruct(|b| b.review_stats = Some(aggregate));
        store.authority().update(&id, &rated).await.unwrap();

        let review = module.create_review(review(id, 4)).await.unwrap();
        let cached = store.cache().find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(cached.review_stats(), &Some(aggregate));

        let unrated = rated.reconstruct(|b| b.review_stats = None);
        store.authority().update(&id, &unrated).await.unwrap();
        module.delete_review(review.id()).await.unwrap();
        let cached = store.cache().find_by_id(&id).await.unwrap().unwrap();
        assert!(cached.review_stats().is_none());

        let again = module.delete_review(review.id()).await;
        assert!(matches!(
            again.map_err(|e| *e.current_context()),
            Err(KernelError::NotFound)
        ));
        let missing = module.delete_review(&ReviewId::new(404)).await;
        assert!(missing.is_err());
    }
}
