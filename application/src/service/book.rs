use error_stack::Report;

use kernel::interface::query::BookCriteria;
use kernel::prelude::entity::{
    Book, BookGenres, BookId, BookPrice, BookStock, BookTitle, CreatedAt, PublishedAt,
};
use kernel::KernelError;

use crate::service::IntegrityGuard;
use crate::store::{DependOnAuthorStore, DependOnBookStore};
use crate::transfer::{CreateBookDto, UpdateBookDto};

#[async_trait::async_trait]
pub trait GetBookService: 'static + Sync + Send + DependOnBookStore {
    async fn get_book(&self, id: &BookId) -> error_stack::Result<Book, KernelError> {
        self.book_store().get(id).await
    }

    async fn get_all_books(&self) -> error_stack::Result<Vec<Book>, KernelError> {
        self.book_store().list().await
    }

    async fn search_books(
        &self,
        criteria: &BookCriteria,
    ) -> error_stack::Result<Vec<Book>, KernelError> {
        self.book_store().search(criteria).await
    }
}

impl<T> GetBookService for T where T: DependOnBookStore {}

#[async_trait::async_trait]
pub trait CreateBookService: 'static + Sync + Send + DependOnAuthorStore + DependOnBookStore {
    async fn create_book(&self, dto: CreateBookDto) -> error_stack::Result<Book, KernelError> {
        self.author_store().get(&dto.author_id).await?;
        if dto.stock < 1 {
            return Err(Report::new(KernelError::Validation)
                .attach_printable(format!("new books need stock, got {}", dto.stock)));
        }
        let book = Book::new(
            BookId::new(0),
            BookTitle::new(dto.title),
            dto.author_id,
            BookGenres::new(dto.genres),
            PublishedAt::new(dto.published_at),
            BookPrice::new(dto.price),
            BookStock::new(dto.stock),
            CreatedAt::now(),
            None,
        );
        self.book_store().create(&book).await
    }
}

impl<T> CreateBookService for T where T: DependOnAuthorStore + DependOnBookStore {}

#[async_trait::async_trait]
pub trait UpdateBookService:
    'static + Sync + Send + DependOnAuthorStore + DependOnBookStore + IntegrityGuard
{
    async fn update_book(&self, dto: UpdateBookDto) -> error_stack::Result<Book, KernelError> {
        let UpdateBookDto {
            id,
            title,
            author_id,
            genres,
            published_at,
            price,
            stock,
        } = dto;
        let existing = self.book_store().get(&id).await?;
        if existing.author_id() != &author_id {
            // Ordered books keep their author.
            self.ensure_book_unreferenced(&id).await?;
            self.author_store().get(&author_id).await?;
        }
        let book = Book::new(
            id,
            BookTitle::new(title),
            author_id,
            BookGenres::new(genres),
            PublishedAt::new(published_at),
            BookPrice::new(price),
            BookStock::new(stock),
            *existing.created_at(),
            existing.review_stats().clone(),
        );
        self.book_store().update(&id, &book).await
    }
}

impl<T> UpdateBookService for T where T: DependOnAuthorStore + DependOnBookStore + IntegrityGuard {}

#[async_trait::async_trait]
pub trait DeleteBookService: 'static + Sync + Send + DependOnBookStore + IntegrityGuard {
    async fn delete_book(&self, id: &BookId) -> error_stack::Result<(), KernelError> {
        self.ensure_book_unreferenced(id).await?;
        self.book_store().delete(id).await
    }
}

impl<T> DeleteBookService for T where T: DependOnBookStore + IntegrityGuard {}

#[cfg(test)]
mod test {
    use rust_decimal::Decimal;
    use time::macros::datetime;

    use kernel::prelude::entity::{AuthorId, Book, BookId, BookStock, ItemQuantity};
    use kernel::KernelError;

    use crate::fixture::{author, customer, TestModule};
    use crate::service::{
        CreateBookService, CreateOrderService, DeleteBookService, GetBookService,
        UpdateBookService,
    };
    use crate::store::{DependOnAuthorStore, DependOnCustomerStore};
    use crate::transfer::{CreateBookDto, CreateOrderDto, RequestedItem, UpdateBookDto};

    fn dto(author_id: AuthorId, stock: i32) -> CreateBookDto {
        CreateBookDto {
            title: "The Dispossessed".to_string(),
            author_id,
            genres: vec!["science fiction".to_string()],
            published_at: datetime!(1974-05-01 0:00 UTC),
            price: Decimal::new(1299, 2),
            stock,
        }
    }

    fn update_of(book: &Book, author_id: AuthorId) -> UpdateBookDto {
        UpdateBookDto {
            id: *book.id(),
            title: book.title().as_ref().clone(),
            author_id,
            genres: vec![],
            published_at: *book.published_at().as_ref(),
            price: *book.price().as_ref(),
            stock: 7,
        }
    }

    async fn order_one(module: &TestModule, book: &Book) {
        let customer = module
            .customer_store()
            .create(&customer("buyer@example.com"))
            .await
            .unwrap();
        module
            .create_order(CreateOrderDto {
                customer_id: *customer.id(),
                items: vec![RequestedItem {
                    book_id: *book.id(),
                    quantity: ItemQuantity::new(1),
                }],
                status: None,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn create_requires_author_and_stock() {
        let module = TestModule::new();
        let missing = module.create_book(dto(AuthorId::new(9), 3)).await;
        assert!(matches!(
            missing.map_err(|e| *e.current_context()),
            Err(KernelError::NotFound)
        ));

        let writer = module.author_store().create(&author("Ursula")).await.unwrap();
        let empty = module.create_book(dto(*writer.id(), 0)).await;
        assert!(matches!(
            empty.map_err(|e| *e.current_context()),
            Err(KernelError::Validation)
        ));

        let created = module.create_book(dto(*writer.id(), 3)).await.unwrap();
        assert_eq!(created.stock(), &BookStock::new(3));
        assert_eq!(module.get_book(created.id()).await.unwrap(), created);
    }

    #[tokio::test]
    async fn missing_book_is_not_found() {
        let module = TestModule::new();
        let result = module.get_book(&BookId::new(1)).await;
        assert!(matches!(
            result.map_err(|e| *e.current_context()),
            Err(KernelError::NotFound)
        ));
    }

    #[tokio::test]
    async fn update_keeps_creation_time() {
        let module = TestModule::new();
        let writer = module.author_store().create(&author("Ursula")).await.unwrap();
        let created = module.create_book(dto(*writer.id(), 3)).await.unwrap();

        let updated = module
            .update_book(update_of(&created, *writer.id()))
            .await
            .unwrap();
        assert_eq!(updated.stock(), &BookStock::new(7));
        assert_eq!(updated.created_at(), created.created_at());
    }

    #[tokio::test]
    async fn ordered_book_keeps_author_and_existence() {
        let module = TestModule::new();
        let writer = module.author_store().create(&author("Ursula")).await.unwrap();
        let other = module.author_store().create(&author("Octavia")).await.unwrap();
        let created = module.create_book(dto(*writer.id(), 3)).await.unwrap();
        order_one(&module, &created).await;

        let moved = module.update_book(update_of(&created, *other.id())).await;
        assert!(matches!(
            moved.map_err(|e| *e.current_context()),
            Err(KernelError::Conflict)
        ));
        let deleted = module.delete_book(created.id()).await;
        assert!(matches!(
            deleted.map_err(|e| *e.current_context()),
            Err(KernelError::Conflict)
        ));
        assert!(module.get_book(created.id()).await.is_ok());
    }

    #[tokio::test]
    async fn unordered_book_can_be_deleted() {
        let module = TestModule::new();
        let writer = module.author_store().create(&author("Ursula")).await.unwrap();
        let created = module.create_book(dto(*writer.id(), 3)).await.unwrap();

        module.delete_book(created.id()).await.unwrap();
        assert!(module.get_all_books().await.unwrap().is_empty());
    }
}
