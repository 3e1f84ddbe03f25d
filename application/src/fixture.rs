use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use error_stack::Report;
use rust_decimal::Decimal;
use time::macros::datetime;

use driver::database::{InMemoryRepository, InMemorySalesReportRepository};
use kernel::interface::query::EntityQuery;
use kernel::interface::update::{
    DependOnReviewRepository, DependOnSalesReportRepository, EntityModifier, StockAdjustment,
    StockModifier,
};
use kernel::prelude::entity::{
    Address, Author, AuthorBiography, AuthorFirstName, AuthorId, AuthorLastName, Book, BookGenres,
    BookId, BookPrice, BookStock, BookTitle, CreatedAt, Customer, CustomerEmail, CustomerId,
    CustomerName, CustomerPassword, CustomerRole, CustomerUsername, Entity, ItemQuantity, Order,
    PublishedAt, Review,
};
use kernel::KernelError;

use crate::store::{
    DependOnAuthorStore, DependOnBookStore, DependOnCustomerStore, DependOnOrderStore, SyncStore,
};

const UNLIMITED: usize = usize::MAX;

/// Switch shared between a test and the repository it sabotages. Holds the
/// number of writes still allowed to succeed.
#[derive(Clone)]
pub struct Faults(Arc<AtomicUsize>);

impl Default for Faults {
    fn default() -> Self {
        Self(Arc::new(AtomicUsize::new(UNLIMITED)))
    }
}

impl Faults {
    pub fn fail_writes(&self, fail: bool) {
        let allowed = if fail { 0 } else { UNLIMITED };
        self.0.store(allowed, Ordering::SeqCst);
    }

    /// Lets `writes` more writes through, then fails every one after them.
    pub fn fail_after(&self, writes: usize) {
        self.0.store(writes, Ordering::SeqCst);
    }

    fn check(&self) -> error_stack::Result<(), KernelError> {
        let allowed = self
            .0
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| match left {
                0 => None,
                UNLIMITED => Some(UNLIMITED),
                left => Some(left - 1),
            });
        if allowed.is_err() {
            return Err(Report::new(KernelError::Internal).attach_printable("injected write fault"));
        }
        Ok(())
    }
}

/// Cache repository whose writes can be made to fail on demand.
#[derive(Clone)]
pub struct Faulty<R> {
    inner: R,
    faults: Faults,
}

impl<R> Faulty<R> {
    pub fn new(inner: R, faults: Faults) -> Self {
        Self { inner, faults }
    }
}

#[async_trait::async_trait]
impl<E: Entity, R: EntityQuery<E>> EntityQuery<E> for Faulty<R> {
    async fn find_by_id(&self, id: &E::Id) -> error_stack::Result<Option<E>, KernelError> {
        self.inner.find_by_id(id).await
    }

    async fn find_all(&self) -> error_stack::Result<Vec<E>, KernelError> {
        self.inner.find_all().await
    }

    async fn search(&self, criteria: &E::Criteria) -> error_stack::Result<Vec<E>, KernelError> {
        self.inner.search(criteria).await
    }
}

#[async_trait::async_trait]
impl<E: Entity, R: EntityModifier<E>> EntityModifier<E> for Faulty<R> {
    async fn create(&self, entity: &E) -> error_stack::Result<E, KernelError> {
        self.faults.check()?;
        self.inner.create(entity).await
    }

    async fn update(&self, id: &E::Id, entity: &E) -> error_stack::Result<E, KernelError> {
        self.faults.check()?;
        self.inner.update(id, entity).await
    }

    async fn delete(&self, id: &E::Id) -> error_stack::Result<(), KernelError> {
        self.faults.check()?;
        self.inner.delete(id).await
    }
}

#[async_trait::async_trait]
impl<R: StockModifier> StockModifier for Faulty<R> {
    async fn reserve(
        &self,
        id: &BookId,
        quantity: &ItemQuantity,
    ) -> error_stack::Result<StockAdjustment, KernelError> {
        self.faults.check()?;
        self.inner.reserve(id, quantity).await
    }

    async fn release(
        &self,
        id: &BookId,
        quantity: &ItemQuantity,
    ) -> error_stack::Result<StockAdjustment, KernelError> {
        self.faults.check()?;
        self.inner.release(id, quantity).await
    }
}

type Store<E> = SyncStore<E, InMemoryRepository<E>, Faulty<InMemoryRepository<E>>>;

/// Two in-process repositories per entity stand in for the authoritative
/// store and the cache.
pub struct TestModule {
    authors: Store<Author>,
    books: Store<Book>,
    customers: Store<Customer>,
    orders: Store<Order>,
    reports: InMemorySalesReportRepository,
    reviews: InMemoryRepository<Review>,
    author_faults: Faults,
    book_faults: Faults,
    customer_faults: Faults,
    order_faults: Faults,
}

fn store<E: Entity>(faults: &Faults) -> Store<E> {
    SyncStore::new(
        InMemoryRepository::new(),
        Faulty::new(InMemoryRepository::new(), faults.clone()),
    )
}

impl TestModule {
    pub fn new() -> Self {
        let (author_faults, book_faults, customer_faults, order_faults) = Default::default();
        Self {
            authors: store(&author_faults),
            books: store(&book_faults),
            customers: store(&customer_faults),
            orders: store(&order_faults),
            reports: InMemorySalesReportRepository::new(),
            reviews: InMemoryRepository::new(),
            author_faults,
            book_faults,
            customer_faults,
            order_faults,
        }
    }

    pub fn author_cache_faults(&self) -> &Faults {
        &self.author_faults
    }

    pub fn book_cache_faults(&self) -> &Faults {
        &self.book_faults
    }

    pub fn customer_cache_faults(&self) -> &Faults {
        &self.customer_faults
    }

    pub fn order_cache_faults(&self) -> &Faults {
        &self.order_faults
    }
}

impl DependOnAuthorStore for TestModule {
    type AuthorAuthority = InMemoryRepository<Author>;
    type AuthorCache = Faulty<InMemoryRepository<Author>>;
    fn author_store(&self) -> &Store<Author> {
        &self.authors
    }
}

impl DependOnBookStore for TestModule {
    type BookAuthority = InMemoryRepository<Book>;
    type BookCache = Faulty<InMemoryRepository<Book>>;
    fn book_store(&self) -> &Store<Book> {
        &self.books
    }
}

impl DependOnCustomerStore for TestModule {
    type CustomerAuthority = InMemoryRepository<Customer>;
    type CustomerCache = Faulty<InMemoryRepository<Customer>>;
    fn customer_store(&self) -> &Store<Customer> {
        &self.customers
    }
}

impl DependOnOrderStore for TestModule {
    type OrderAuthority = InMemoryRepository<Order>;
    type OrderCache = Faulty<InMemoryRepository<Order>>;
    fn order_store(&self) -> &Store<Order> {
        &self.orders
    }
}

impl DependOnSalesReportRepository for TestModule {
    type SalesReportRepository = InMemorySalesReportRepository;
    fn sales_report_repository(&self) -> &Self::SalesReportRepository {
        &self.reports
    }
}

impl DependOnReviewRepository for TestModule {
    type ReviewRepository = InMemoryRepository<Review>;
    fn review_repository(&self) -> &Self::ReviewRepository {
        &self.reviews
    }
}

pub fn author(first_name: &str) -> Author {
    Author::new(
        AuthorId::new(0),
        AuthorFirstName::new(first_name),
        AuthorLastName::new("Writer"),
        AuthorBiography::default(),
    )
}

pub fn book(author_id: i32, stock: i32) -> Book {
    priced_book(author_id, stock, Decimal::new(1000, 2))
}

pub fn priced_book(author_id: i32, stock: i32, price: Decimal) -> Book {
    Book::new(
        BookId::new(0),
        BookTitle::new("Untitled"),
        AuthorId::new(author_id),
        BookGenres::default(),
        PublishedAt::new(datetime!(2001-01-01 0:00 UTC)),
        BookPrice::new(price),
        BookStock::new(stock),
        CreatedAt::now(),
        None,
    )
}

pub fn customer(email: &str) -> Customer {
    Customer::new(
        CustomerId::new(0),
        CustomerName::new("Reader"),
        CustomerUsername::new("reader"),
        CustomerEmail::new(email),
        CustomerPassword::new("not-a-real-hash"),
        Address::default(),
        CustomerRole::User,
        CreatedAt::now(),
    )
}
