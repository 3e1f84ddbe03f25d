use error_stack::Report;
use sqlx::PgConnection;
use time::OffsetDateTime;

use kernel::interface::query::{Criteria, EntityQuery, ReviewCriteria};
use kernel::interface::update::EntityModifier;
use kernel::prelude::entity::{
    BookId, CreatedAt, CustomerId, DestructReview, Entity, EntityId, Review, ReviewId,
    ReviewRating, ReviewText,
};
use kernel::KernelError;

use crate::database::postgres::{sync_sequence, PostgresDatabase};
use crate::error::ConvertError;

pub struct PostgresReviewRepository {
    db: PostgresDatabase,
}

impl PostgresReviewRepository {
    pub fn new(db: PostgresDatabase) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl EntityQuery<Review> for PostgresReviewRepository {
    async fn find_by_id(&self, id: &ReviewId) -> error_stack::Result<Option<Review>, KernelError> {
        let mut con = self.db.acquire().await?;
        PgReviewInternal::find_by_id(&mut con, id).await
    }

    async fn find_all(&self) -> error_stack::Result<Vec<Review>, KernelError> {
        let mut con = self.db.acquire().await?;
        PgReviewInternal::find_all(&mut con).await
    }

    async fn search(
        &self,
        criteria: &ReviewCriteria,
    ) -> error_stack::Result<Vec<Review>, KernelError> {
        let reviews = self.find_all().await?;
        Ok(reviews
            .into_iter()
            .filter(|review| criteria.matches(review))
            .collect())
    }
}

#[async_trait::async_trait]
impl EntityModifier<Review> for PostgresReviewRepository {
    async fn create(&self, review: &Review) -> error_stack::Result<Review, KernelError> {
        review.validate()?;
        let mut con = self.db.acquire().await?;
        PgReviewInternal::create(&mut con, review).await
    }

    async fn update(
        &self,
        id: &ReviewId,
        review: &Review,
    ) -> error_stack::Result<Review, KernelError> {
        let review = review.clone().with_id(*id);
        review.validate()?;
        let mut con = self.db.acquire().await?;
        PgReviewInternal::update(&mut con, &review).await
    }

    async fn delete(&self, id: &ReviewId) -> error_stack::Result<(), KernelError> {
        let mut con = self.db.acquire().await?;
        PgReviewInternal::delete(&mut con, id).await
    }
}

#[derive(sqlx::FromRow)]
struct ReviewRow {
    id: i32,
    book_id: i32,
    customer_id: Option<i32>,
    rating: i32,
    review_text: String,
    created_at: OffsetDateTime,
}

impl From<ReviewRow> for Review {
    fn from(value: ReviewRow) -> Self {
        Review::new(
            ReviewId::new(value.id),
            BookId::new(value.book_id),
            value.customer_id.map(CustomerId::new),
            ReviewRating::new(value.rating),
            ReviewText::new(value.review_text),
            CreatedAt::new(value.created_at),
        )
    }
}

pub(in crate::database) struct PgReviewInternal;

impl PgReviewInternal {
    async fn find_by_id(
        con: &mut PgConnection,
        id: &ReviewId,
    ) -> error_stack::Result<Option<Review>, KernelError> {
        let row = sqlx::query_as::<_, ReviewRow>(
            // language=postgresql
            r#"
            SELECT id, book_id, customer_id, rating, review_text, created_at
            FROM reviews
            WHERE id = $1
            "#,
        )
        .bind(id.as_ref())
        .fetch_optional(con)
        .await
        .convert_error()?;
        Ok(row.map(Review::from))
    }

    async fn find_all(con: &mut PgConnection) -> error_stack::Result<Vec<Review>, KernelError> {
        let rows = sqlx::query_as::<_, ReviewRow>(
            // language=postgresql
            r#"
            SELECT id, book_id, customer_id, rating, review_text, created_at
            FROM reviews
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(con)
        .await
        .convert_error()?;
        Ok(rows.into_iter().map(Review::from).collect())
    }

    async fn create(
        con: &mut PgConnection,
        review: &Review,
    ) -> error_stack::Result<Review, KernelError> {
        let explicit = review.id().is_assigned();
        let DestructReview {
            id,
            book_id,
            customer_id,
            rating,
            text,
            created_at,
        } = review.clone().into_destruct();
        let statement = if explicit {
            // language=postgresql
            r#"
            INSERT INTO reviews (book_id, customer_id, rating, review_text, created_at, id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, book_id, customer_id, rating, review_text, created_at
            "#
        } else {
            // language=postgresql
            r#"
            INSERT INTO reviews (book_id, customer_id, rating, review_text, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, book_id, customer_id, rating, review_text, created_at
            "#
        };
        let mut query = sqlx::query_as::<_, ReviewRow>(statement)
            .bind(book_id.as_ref())
            .bind(customer_id.map(|id| *id.as_ref()))
            .bind(rating.as_ref())
            .bind(text.as_ref())
            .bind(created_at.as_ref());
        if explicit {
            query = query.bind(id.as_ref());
        }
        let row = query.fetch_one(&mut *con).await.convert_error()?;
        if explicit {
            sync_sequence(con, "reviews").await?;
        }
        Ok(Review::from(row))
    }

    async fn update(
        con: &mut PgConnection,
        review: &Review,
    ) -> error_stack::Result<Review, KernelError> {
        let row = sqlx::query_as::<_, ReviewRow>(
            // language=postgresql
            r#"
            UPDATE reviews
            SET rating = $2, review_text = $3
            WHERE id = $1
            RETURNING id, book_id, customer_id, rating, review_text, created_at
            "#,
        )
        .bind(review.id().as_ref())
        .bind(review.rating().as_ref())
        .bind(review.text().as_ref())
        .fetch_optional(con)
        .await
        .convert_error()?;
        row.map(Review::from).ok_or_else(|| {
            Report::new(KernelError::NotFound)
                .attach_printable(format!("{} does not exist", review.id()))
        })
    }

    async fn delete(con: &mut PgConnection, id: &ReviewId) -> error_stack::Result<(), KernelError> {
        // language=postgresql
        let result = sqlx::query(
            r#"
            DELETE FROM reviews
            WHERE id = $1
            "#,
        )
        .bind(id.as_ref())
        .execute(con)
        .await
        .convert_error()?;
        if result.rows_affected() == 0 {
            return Err(Report::new(KernelError::NotFound)
                .attach_printable(format!("{id} does not exist")));
        }
        Ok(())
    }
}
