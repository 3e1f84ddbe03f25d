use error_stack::Report;
use rust_decimal::Decimal;
use sqlx::PgConnection;
use time::OffsetDateTime;

use kernel::interface::query::{BookCriteria, Criteria, EntityQuery};
use kernel::interface::update::{EntityModifier, StockAdjustment, StockModifier};
use kernel::prelude::entity::{
    AuthorId, Book, BookGenres, BookId, BookPrice, BookReviewAggregate, BookStock, BookTitle,
    CreatedAt, Entity, EntityId, ItemQuantity, PublishedAt,
};
use kernel::KernelError;

use crate::database::postgres::{sync_sequence, PostgresDatabase};
use crate::error::ConvertError;

pub struct PostgresBookRepository {
    db: PostgresDatabase,
}

impl PostgresBookRepository {
    pub fn new(db: PostgresDatabase) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl EntityQuery<Book> for PostgresBookRepository {
    async fn find_by_id(&self, id: &BookId) -> error_stack::Result<Option<Book>, KernelError> {
        let mut con = self.db.acquire().await?;
        PgBookInternal::find_by_id(&mut con, id).await
    }

    async fn find_all(&self) -> error_stack::Result<Vec<Book>, KernelError> {
        let mut con = self.db.acquire().await?;
        PgBookInternal::find_all(&mut con).await
    }

    async fn search(&self, criteria: &BookCriteria) -> error_stack::Result<Vec<Book>, KernelError> {
        let books = self.find_all().await?;
        Ok(books
            .into_iter()
            .filter(|book| criteria.matches(book))
            .collect())
    }
}

#[async_trait::async_trait]
impl EntityModifier<Book> for PostgresBookRepository {
    async fn create(&self, book: &Book) -> error_stack::Result<Book, KernelError> {
        book.validate()?;
        let mut con = self.db.acquire().await?;
        PgBookInternal::create(&mut con, book).await
    }

    async fn update(&self, id: &BookId, book: &Book) -> error_stack::Result<Book, KernelError> {
        let book = book.clone().with_id(*id);
        book.validate()?;
        let mut con = self.db.acquire().await?;
        PgBookInternal::update(&mut con, &book).await
    }

    async fn delete(&self, id: &BookId) -> error_stack::Result<(), KernelError> {
        let mut con = self.db.acquire().await?;
        PgBookInternal::delete(&mut con, id).await
    }
}

#[async_trait::async_trait]
impl StockModifier for PostgresBookRepository {
    async fn reserve(
        &self,
        id: &BookId,
        quantity: &ItemQuantity,
    ) -> error_stack::Result<StockAdjustment, KernelError> {
        let mut con = self.db.acquire().await?;
        PgBookInternal::reserve(&mut con, id, quantity).await
    }

    async fn release(
        &self,
        id: &BookId,
        quantity: &ItemQuantity,
    ) -> error_stack::Result<StockAdjustment, KernelError> {
        let mut con = self.db.acquire().await?;
        PgBookInternal::release(&mut con, id, quantity).await
    }
}

#[derive(sqlx::FromRow)]
struct BookRow {
    id: i32,
    title: String,
    author_id: i32,
    genres: Vec<String>,
    published_at: OffsetDateTime,
    price: Decimal,
    stock: i32,
    created_at: OffsetDateTime,
    average_rating: Option<Decimal>,
    review_count: Option<i32>,
}

impl From<BookRow> for Book {
    fn from(value: BookRow) -> Self {
        let review_stats = value
            .review_count
            .map(|count| BookReviewAggregate::new(value.average_rating.unwrap_or_default(), count));
        Book::new(
            BookId::new(value.id),
            BookTitle::new(value.title),
            AuthorId::new(value.author_id),
            BookGenres::new(value.genres),
            PublishedAt::new(value.published_at),
            BookPrice::new(value.price),
            BookStock::new(value.stock),
            CreatedAt::new(value.created_at),
            review_stats,
        )
    }
}

// language=postgresql
const SELECT_BOOKS: &str = r#"
    SELECT b.id, b.title, b.author_id, b.genres, b.published_at, b.price, b.stock, b.created_at,
           r.average_rating, r.review_count
    FROM books b
    LEFT JOIN (
        SELECT book_id, ROUND(AVG(rating), 2) AS average_rating, COUNT(*)::INTEGER AS review_count
        FROM reviews
        GROUP BY book_id
    ) r ON r.book_id = b.id
"#;

pub(in crate::database) struct PgBookInternal;

impl PgBookInternal {
    async fn find_by_id(
        con: &mut PgConnection,
        id: &BookId,
    ) -> error_stack::Result<Option<Book>, KernelError> {
        let statement = format!("{SELECT_BOOKS} WHERE b.id = $1");
        let row = sqlx::query_as::<_, BookRow>(&statement)
            .bind(id.as_ref())
            .fetch_optional(con)
            .await
            .convert_error()?;
        Ok(row.map(Book::from))
    }

    async fn find_all(con: &mut PgConnection) -> error_stack::Result<Vec<Book>, KernelError> {
        let statement = format!("{SELECT_BOOKS} ORDER BY b.id");
        let rows = sqlx::query_as::<_, BookRow>(&statement)
            .fetch_all(con)
            .await
            .convert_error()?;
        Ok(rows.into_iter().map(Book::from).collect())
    }

    async fn reload(con: &mut PgConnection, id: &BookId) -> error_stack::Result<Book, KernelError> {
        Self::find_by_id(con, id).await?.ok_or_else(|| {
            Report::new(KernelError::Internal)
                .attach_printable(format!("{id} vanished right after it was written"))
        })
    }

    async fn create(con: &mut PgConnection, book: &Book) -> error_stack::Result<Book, KernelError> {
        let explicit = book.id().is_assigned();
        let id: i32 = if explicit {
            sqlx::query_scalar(
                // language=postgresql
                r#"
                INSERT INTO books (id, title, author_id, genres, published_at, price, stock, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING id
                "#,
            )
            .bind(book.id().as_ref())
        } else {
            sqlx::query_scalar(
                // language=postgresql
                r#"
                INSERT INTO books (title, author_id, genres, published_at, price, stock, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING id
                "#,
            )
        }
        .bind(book.title().as_ref())
        .bind(book.author_id().as_ref())
        .bind(book.genres().as_ref())
        .bind(book.published_at().as_ref())
        .bind(book.price().as_ref())
        .bind(book.stock().as_ref())
        .bind(book.created_at().as_ref())
        .fetch_one(&mut *con)
        .await
        .convert_error()?;
        if explicit {
            sync_sequence(con, "books").await?;
        }
        Self::reload(con, &BookId::new(id)).await
    }

    async fn update(con: &mut PgConnection, book: &Book) -> error_stack::Result<Book, KernelError> {
        let updated: Option<i32> = sqlx::query_scalar(
            // language=postgresql
            r#"
            UPDATE books
            SET title = $2, author_id = $3, genres = $4, published_at = $5, price = $6, stock = $7
            WHERE id = $1
            RETURNING id
            "#,
        )
        .bind(book.id().as_ref())
        .bind(book.title().as_ref())
        .bind(book.author_id().as_ref())
        .bind(book.genres().as_ref())
        .bind(book.published_at().as_ref())
        .bind(book.price().as_ref())
        .bind(book.stock().as_ref())
        .fetch_optional(&mut *con)
        .await
        .convert_error()?;
        match updated {
            Some(id) => Self::reload(con, &BookId::new(id)).await,
            None => Err(Report::new(KernelError::NotFound)
                .attach_printable(format!("{} does not exist", book.id()))),
        }
    }

    async fn delete(con: &mut PgConnection, id: &BookId) -> error_stack::Result<(), KernelError> {
        // language=postgresql
        let result = sqlx::query(
            r#"
            DELETE FROM books
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

    async fn reserve(
        con: &mut PgConnection,
        id: &BookId,
        quantity: &ItemQuantity,
    ) -> error_stack::Result<StockAdjustment, KernelError> {
        // The guard and the decrement run as one statement.
        let reserved: Option<i32> = sqlx::query_scalar(
            // language=postgresql
            r#"
            UPDATE books
            SET stock = stock - $2
            WHERE id = $1 AND stock > 0 AND stock >= $2
            RETURNING id
            "#,
        )
        .bind(id.as_ref())
        .bind(quantity.as_ref())
        .fetch_optional(&mut *con)
        .await
        .convert_error()?;
        if reserved.is_some() {
            return Ok(StockAdjustment::Applied(Self::reload(con, id).await?));
        }

        let stock: Option<i32> = sqlx::query_scalar(
            // language=postgresql
            r#"
            SELECT stock FROM books WHERE id = $1
            "#,
        )
        .bind(id.as_ref())
        .fetch_optional(&mut *con)
        .await
        .convert_error()?;
        Ok(match stock {
            Some(stock) => StockAdjustment::Insufficient(BookStock::new(stock)),
            None => StockAdjustment::Missing,
        })
    }

    async fn release(
        con: &mut PgConnection,
        id: &BookId,
        quantity: &ItemQuantity,
    ) -> error_stack::Result<StockAdjustment, KernelError> {
        let released: Option<i32> = sqlx::query_scalar(
            // language=postgresql
            r#"
            UPDATE books
            SET stock = stock + $2
            WHERE id = $1
            RETURNING id
            "#,
        )
        .bind(id.as_ref())
        .bind(quantity.as_ref())
        .fetch_optional(&mut *con)
        .await
        .convert_error()?;
        match released {
            Some(_) => Ok(StockAdjustment::Applied(Self::reload(con, id).await?)),
            None => Ok(StockAdjustment::Missing),
        }
    }
}

#[cfg(test)]
mod test {
    use rand::Rng;
    use rust_decimal::Decimal;
    use time::macros::datetime;

    use kernel::interface::query::EntityQuery;
    use kernel::interface::update::{EntityModifier, StockAdjustment, StockModifier};
    use kernel::prelude::entity::{
        AuthorId, Book, BookGenres, BookId, BookPrice, BookStock, BookTitle, CreatedAt,
        ItemQuantity, PublishedAt,
    };
    use kernel::KernelError;

    use crate::database::postgres::PostgresDatabase;
    use crate::database::PostgresBookRepository;

    fn book(id: i32, stock: i32) -> Book {
        Book::new(
            BookId::new(id),
            BookTitle::new("Solaris"),
            AuthorId::new(1),
            BookGenres::new(["sf"]),
            PublishedAt::new(datetime!(1961-01-01 0:00 UTC)),
            BookPrice::new(Decimal::new(1250, 2)),
            BookStock::new(stock),
            CreatedAt::now(),
            None,
        )
    }

    #[test_with::env(POSTGRES_TEST)]
    #[tokio::test]
    async fn test() -> error_stack::Result<(), KernelError> {
        let db = PostgresDatabase::new().await?;
        db.migrate().await?;
        let repository = PostgresBookRepository::new(db);

        let created = repository.create(&book(0, 2)).await?;
        let id = *created.id();
        assert_eq!(repository.find_by_id(&id).await?, Some(created.clone()));

        let book = created.reconstruct(|b| b.title = BookTitle::new("Solaris (2nd ed.)"));
        let updated = repository.update(&id, &book).await?;
        assert_eq!(updated, book);

        repository.delete(&id).await?;
        assert!(repository.find_by_id(&id).await?.is_none());
        Ok(())
    }

    #[test_with::env(POSTGRES_TEST)]
    #[tokio::test]
    async fn conditional_stock_update() -> error_stack::Result<(), KernelError> {
        let db = PostgresDatabase::new().await?;
        db.migrate().await?;
        let repository = PostgresBookRepository::new(db);

        let explicit = rand::thread_rng().gen_range(1_000_000..2_000_000);
        let created = repository.create(&book(explicit, 3)).await?;
        let id = *created.id();
        assert_eq!(id, BookId::new(explicit));

        let over = repository.reserve(&id, &ItemQuantity::new(5)).await?;
        assert_eq!(over, StockAdjustment::Insufficient(BookStock::new(3)));

        let reserved = repository.reserve(&id, &ItemQuantity::new(3)).await?;
        assert!(matches!(reserved, StockAdjustment::Applied(book) if book.stock() == &BookStock::new(0)));

        let released = repository.release(&id, &ItemQuantity::new(1)).await?;
        assert!(matches!(released, StockAdjustment::Applied(book) if book.stock() == &BookStock::new(1)));

        repository.delete(&id).await?;
        let missing = repository.reserve(&id, &ItemQuantity::new(1)).await?;
        assert_eq!(missing, StockAdjustment::Missing);
        Ok(())
    }
}
