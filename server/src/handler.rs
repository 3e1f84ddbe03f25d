use application::store::{
    CacheLoad, DependOnAuthorStore, DependOnBookStore, DependOnCustomerStore, DependOnOrderStore,
    SyncStore,
};
use application::transfer::SalesReportConfig;
use driver::database::{
    InMemoryRepository, PostgresAuthorRepository, PostgresBookRepository,
    PostgresCustomerRepository, PostgresDatabase, PostgresOrderRepository,
    PostgresReviewRepository, PostgresSalesReportRepository,
};
use kernel::interface::update::{DependOnReviewRepository, DependOnSalesReportRepository};
use kernel::prelude::entity::{Author, Book, Customer, Order};
use kernel::KernelError;
use std::ops::Deref;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Clone)]
pub struct AppModule(Arc<Handler>);

impl AppModule {
    pub async fn new(
        sales_report: SalesReportConfig,
        shutdown: CancellationToken,
    ) -> error_stack::Result<Self, KernelError> {
        Ok(Self(Arc::new(Handler::init(sales_report, shutdown).await?)))
    }

    pub fn shared(&self) -> Arc<Handler> {
        Arc::clone(&self.0)
    }
}

impl Deref for AppModule {
    type Target = Handler;
    fn deref(&self) -> &Self::Target {
        Deref::deref(&self.0)
    }
}

type Store<E, R> = SyncStore<E, R, InMemoryRepository<E>>;

/// One coordinator per entity, each pairing a PostgreSQL repository with its
/// in-process cache.
pub struct Handler {
    authors: Store<Author, PostgresAuthorRepository>,
    books: Store<Book, PostgresBookRepository>,
    customers: Store<Customer, PostgresCustomerRepository>,
    orders: Store<Order, PostgresOrderRepository>,
    reports: PostgresSalesReportRepository,
    reviews: PostgresReviewRepository,
    sales_report: SalesReportConfig,
    shutdown: CancellationToken,
}

impl Handler {
    pub async fn init(
        sales_report: SalesReportConfig,
        shutdown: CancellationToken,
    ) -> error_stack::Result<Self, KernelError> {
        let pgpool = PostgresDatabase::new().await?;
        pgpool.migrate().await?;

        Ok(Self {
            authors: SyncStore::new(
                PostgresAuthorRepository::new(pgpool.clone()),
                InMemoryRepository::new(),
            ),
            books: SyncStore::new(
                PostgresBookRepository::new(pgpool.clone()),
                InMemoryRepository::new(),
            ),
            customers: SyncStore::new(
                PostgresCustomerRepository::new(pgpool.clone()),
                InMemoryRepository::new(),
            ),
            orders: SyncStore::new(
                PostgresOrderRepository::new(pgpool.clone()),
                InMemoryRepository::new(),
            ),
            reports: PostgresSalesReportRepository::new(pgpool.clone()),
            reviews: PostgresReviewRepository::new(pgpool),
            sales_report,
            shutdown,
        })
    }

    pub fn sales_report_config(&self) -> &SalesReportConfig {
        &self.sales_report
    }

    /// Cancelled together with the server.
    pub fn shutdown_signal(&self) -> CancellationToken {
        self.shutdown.child_token()
    }

    /// Fills each empty cache from PostgreSQL. Caches that already hold
    /// entries are left alone.
    pub async fn warm_up(&self) -> error_stack::Result<(), KernelError> {
        let loads: [(&str, CacheLoad); 4] = [
            ("author", self.authors.load_cache_if_empty().await?),
            ("book", self.books.load_cache_if_empty().await?),
            ("customer", self.customers.load_cache_if_empty().await?),
            ("order", self.orders.load_cache_if_empty().await?),
        ];
        for (kind, load) in loads {
            if let CacheLoad::Loaded { failed, .. } = load {
                if failed > 0 {
                    tracing::warn!(kind, failed, "cache started with missing entries");
                }
            }
        }
        Ok(())
    }
}

impl DependOnAuthorStore for Handler {
    type AuthorAuthority = PostgresAuthorRepository;
    type AuthorCache = InMemoryRepository<Author>;
    fn author_store(&self) -> &Store<Author, PostgresAuthorRepository> {
        &self.authors
    }
}

impl DependOnBookStore for Handler {
    type BookAuthority = PostgresBookRepository;
    type BookCache = InMemoryRepository<Book>;
    fn book_store(&self) -> &Store<Book, PostgresBookRepository> {
        &self.books
    }
}

impl DependOnCustomerStore for Handler {
    type CustomerAuthority = PostgresCustomerRepository;
    type CustomerCache = InMemoryRepository<Customer>;
    fn customer_store(&self) -> &Store<Customer, PostgresCustomerRepository> {
        &self.customers
    }
}

impl DependOnOrderStore for Handler {
    type OrderAuthority = PostgresOrderRepository;
    type OrderCache = InMemoryRepository<Order>;
    fn order_store(&self) -> &Store<Order, PostgresOrderRepository> {
        &self.orders
    }
}

impl DependOnSalesReportRepository for Handler {
    type SalesReportRepository = PostgresSalesReportRepository;
    fn sales_report_repository(&self) -> &Self::SalesReportRepository {
        &self.reports
    }
}

impl DependOnReviewRepository for Handler {
    type ReviewRepository = PostgresReviewRepository;
    fn review_repository(&self) -> &Self::ReviewRepository {
        &self.reviews
    }
}
