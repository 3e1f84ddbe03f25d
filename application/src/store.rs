use std::marker::PhantomData;

use error_stack::Report;

use kernel::interface::query::EntityQuery;
use kernel::interface::update::{EntityModifier, Repository, StockAdjustment, StockModifier};
use kernel::prelude::entity::{Author, Book, BookId, Customer, Entity, ItemQuantity, Order};
use kernel::KernelError;

/// Undo step applied to the authoritative store when the cache mirror fails.
#[derive(Debug, Clone)]
pub enum Compensation<E: Entity> {
    /// Undo a create.
    Remove(E::Id),
    /// Undo an update.
    Restore(E),
    /// Undo a delete.
    Recreate(E),
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum CacheLoad {
    Loaded { loaded: usize, failed: usize },
    Skipped { cached: usize },
}

/// Write-through / read-aside coordinator between the authoritative store
/// and its cache. Writes hit the authority first; the cache only ever mirrors
/// a successful authoritative result.
pub struct SyncStore<E: Entity, A, C> {
    authority: A,
    cache: C,
    _entity: PhantomData<fn() -> E>,
}

impl<E, A, C> SyncStore<E, A, C>
where
    E: Entity,
    A: Repository<E>,
    C: Repository<E>,
{
    pub fn new(authority: A, cache: C) -> Self {
        Self {
            authority,
            cache,
            _entity: PhantomData,
        }
    }

    pub fn authority(&self) -> &A {
        &self.authority
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Imports every authoritative entity, but only into an empty cache.
    /// A populated cache is left as is, even if it is stale.
    #[tracing::instrument(skip_all, fields(kind = E::KIND))]
    pub async fn load_cache_if_empty(&self) -> error_stack::Result<CacheLoad, KernelError> {
        let cached = self.cache.find_all().await?.len();
        if cached > 0 {
            tracing::info!(cached, "cache already populated, skipping import");
            return Ok(CacheLoad::Skipped { cached });
        }

        let (mut loaded, mut failed) = (0, 0);
        for entity in self.authority.find_all().await? {
            match self.cache.create(&entity).await {
                Ok(_) => loaded += 1,
                Err(report) => {
                    failed += 1;
                    tracing::warn!(id = %entity.entity_id(), "cache import failed: {report:?}");
                }
            }
        }
        tracing::info!(loaded, failed, "cache imported");
        Ok(CacheLoad::Loaded { loaded, failed })
    }

    pub async fn find(&self, id: &E::Id) -> error_stack::Result<Option<E>, KernelError> {
        if let Some(cached) = self.cache.find_by_id(id).await? {
            return Ok(Some(cached));
        }
        let Some(entity) = self.authority.find_by_id(id).await? else {
            return Ok(None);
        };
        if let Err(report) = self.mirror(&entity).await {
            tracing::warn!(kind = E::KIND, %id, "cache backfill failed: {report:?}");
        }
        Ok(Some(entity))
    }

    pub async fn find_authoritative(
        &self,
        id: &E::Id,
    ) -> error_stack::Result<Option<E>, KernelError> {
        self.authority.find_by_id(id).await
    }

    pub async fn get(&self, id: &E::Id) -> error_stack::Result<E, KernelError> {
        self.find(id).await?.ok_or_else(|| {
            Report::new(KernelError::NotFound).attach_printable(format!("{id} does not exist"))
        })
    }

    pub async fn list(&self) -> error_stack::Result<Vec<E>, KernelError> {
        self.cache.find_all().await
    }

    pub async fn list_authoritative(&self) -> error_stack::Result<Vec<E>, KernelError> {
        self.authority.find_all().await
    }

    pub async fn search(&self, criteria: &E::Criteria) -> error_stack::Result<Vec<E>, KernelError> {
        self.cache.search(criteria).await
    }

    #[tracing::instrument(skip_all, fields(kind = E::KIND))]
    pub async fn create(&self, entity: &E) -> error_stack::Result<E, KernelError> {
        let created = self.authority.create(entity).await?;
        if let Err(report) = self.mirror(&created).await {
            let compensation = Compensation::Remove(created.entity_id());
            return Err(self.diverged(report, compensation).await);
        }
        tracing::info!(id = %created.entity_id(), "created");
        Ok(created)
    }

    #[tracing::instrument(skip_all, fields(kind = E::KIND, %id))]
    pub async fn update(&self, id: &E::Id, entity: &E) -> error_stack::Result<E, KernelError> {
        let previous = self.authority.find_by_id(id).await?.ok_or_else(|| {
            Report::new(KernelError::NotFound).attach_printable(format!("{id} does not exist"))
        })?;
        let updated = self.authority.update(id, entity).await?;
        if let Err(report) = self.mirror(&updated).await {
            return Err(self.diverged(report, Compensation::Restore(previous)).await);
        }
        tracing::info!("updated");
        Ok(updated)
    }

    #[tracing::instrument(skip_all, fields(kind = E::KIND, %id))]
    pub async fn delete(&self, id: &E::Id) -> error_stack::Result<(), KernelError> {
        let Some(previous) = self.authority.find_by_id(id).await? else {
            // A cached copy of something the authority no longer has is stale.
            if let Err(report) = self.evict(id).await {
                tracing::warn!("stale cache entry could not be evicted: {report:?}");
            }
            return Err(Report::new(KernelError::NotFound)
                .attach_printable(format!("{id} does not exist")));
        };
        self.authority.delete(id).await?;
        if let Err(report) = self.evict(id).await {
            return Err(self.diverged(report, Compensation::Recreate(previous)).await);
        }
        tracing::info!("deleted");
        Ok(())
    }

    /// Applies the undo step to the authoritative store. A failure here leaves
    /// the stores disagreeing and is reported for manual reconciliation.
    pub async fn compensate(
        &self,
        compensation: Compensation<E>,
    ) -> error_stack::Result<(), KernelError> {
        tracing::warn!(kind = E::KIND, ?compensation, "compensating authoritative write");
        let result = match &compensation {
            Compensation::Remove(id) => self.authority.delete(id).await,
            Compensation::Restore(previous) => self
                .authority
                .update(&previous.entity_id(), previous)
                .await
                .map(|_| ()),
            Compensation::Recreate(previous) => {
                self.authority.create(previous).await.map(|_| ())
            }
        };
        result.map_err(|report| {
            tracing::error!(
                kind = E::KIND,
                ?compensation,
                "compensation failed, stores need manual reconciliation: {report:?}"
            );
            report
                .change_context(KernelError::Internal)
                .attach_printable(format!("manual reconciliation required: {compensation:?}"))
        })
    }

    async fn diverged(
        &self,
        cause: Report<KernelError>,
        compensation: Compensation<E>,
    ) -> Report<KernelError> {
        let mut report = cause
            .change_context(KernelError::Internal)
            .attach_printable(format!("{} cache mirror failed", E::KIND));
        if let Err(failure) = self.compensate(compensation).await {
            report.extend_one(failure);
        }
        report
    }

    /// Upserts the authoritative value into the cache.
    async fn mirror(&self, entity: &E) -> error_stack::Result<E, KernelError> {
        match self.cache.update(&entity.entity_id(), entity).await {
            Err(report) if *report.current_context() == KernelError::NotFound => {
                self.cache.create(entity).await
            }
            other => other,
        }
    }

    async fn evict(&self, id: &E::Id) -> error_stack::Result<(), KernelError> {
        match self.cache.delete(id).await {
            Err(report) if *report.current_context() == KernelError::NotFound => Ok(()),
            other => other,
        }
    }
}

impl<A, C> SyncStore<Book, A, C>
where
    A: Repository<Book> + StockModifier,
    C: Repository<Book> + StockModifier,
{
    /// Takes stock from the authority, then applies the same delta to the
    /// cache. A cache copy that disagrees afterwards is overwritten.
    #[tracing::instrument(skip_all, fields(%id, quantity = quantity.as_ref()))]
    pub async fn reserve_stock(
        &self,
        id: &BookId,
        quantity: &ItemQuantity,
    ) -> error_stack::Result<StockAdjustment, KernelError> {
        let adjustment = self.authority.reserve(id, quantity).await?;
        let StockAdjustment::Applied(book) = &adjustment else {
            self.refresh(id).await;
            return Ok(adjustment);
        };
        let mirrored = self.cache.reserve(id, quantity).await;
        if let Err(report) = self.settle(book, mirrored).await {
            if let Err(failure) = self.authority.release(id, quantity).await {
                tracing::error!(
                    "reserved stock could not be returned, stores need manual reconciliation: {failure:?}"
                );
            }
            return Err(report
                .change_context(KernelError::Internal)
                .attach_printable(format!("stock reservation of {id} was rolled back")));
        }
        Ok(adjustment)
    }

    #[tracing::instrument(skip_all, fields(%id, quantity = quantity.as_ref()))]
    pub async fn release_stock(
        &self,
        id: &BookId,
        quantity: &ItemQuantity,
    ) -> error_stack::Result<StockAdjustment, KernelError> {
        let adjustment = self.authority.release(id, quantity).await?;
        let StockAdjustment::Applied(book) = &adjustment else {
            self.refresh(id).await;
            return Ok(adjustment);
        };
        let mirrored = self.cache.release(id, quantity).await;
        if let Err(report) = self.settle(book, mirrored).await {
            match self.authority.reserve(id, quantity).await {
                Ok(StockAdjustment::Applied(_)) => {}
                Ok(other) => tracing::error!(
                    ?other,
                    "released stock could not be taken back, stores need manual reconciliation"
                ),
                Err(failure) => tracing::error!(
                    "released stock could not be taken back, stores need manual reconciliation: {failure:?}"
                ),
            }
            return Err(report
                .change_context(KernelError::Internal)
                .attach_printable(format!("stock release of {id} was rolled back")));
        }
        Ok(adjustment)
    }

    async fn settle(
        &self,
        authoritative: &Book,
        mirrored: error_stack::Result<StockAdjustment, KernelError>,
    ) -> error_stack::Result<(), KernelError> {
        match mirrored? {
            StockAdjustment::Applied(cached) if cached.stock() == authoritative.stock() => Ok(()),
            drift => {
                tracing::warn!(
                    id = %authoritative.id(),
                    ?drift,
                    "cached stock drifted, overwriting with authoritative value"
                );
                self.mirror(authoritative).await.map(|_| ())
            }
        }
    }

    /// Best-effort resync of one cached book from the authority, used after
    /// a refused change and whenever derived fields may have moved.
    pub async fn refresh(&self, id: &BookId) {
        let result = match self.authority.find_by_id(id).await {
            Ok(Some(book)) => self.mirror(&book).await.map(|_| ()),
            Ok(None) => self.evict(id).await,
            Err(report) => Err(report),
        };
        if let Err(report) = result {
            tracing::warn!(%id, "cached book could not be refreshed: {report:?}");
        }
    }
}

pub trait DependOnAuthorStore: 'static + Sync + Send {
    type AuthorAuthority: Repository<Author>;
    type AuthorCache: Repository<Author>;
    fn author_store(&self) -> &SyncStore<Author, Self::AuthorAuthority, Self::AuthorCache>;
}

pub trait DependOnBookStore: 'static + Sync + Send {
    type BookAuthority: Repository<Book> + StockModifier;
    type BookCache: Repository<Book> + StockModifier;
    fn book_store(&self) -> &SyncStore<Book, Self::BookAuthority, Self::BookCache>;
}

pub trait DependOnCustomerStore: 'static + Sync + Send {
    type CustomerAuthority: Repository<Customer>;
    type CustomerCache: Repository<Customer>;
    fn customer_store(
        &self,
    ) -> &SyncStore<Customer, Self::CustomerAuthority, Self::CustomerCache>;
}

pub trait DependOnOrderStore: 'static + Sync + Send {
    type OrderAuthority: Repository<Order>;
    type OrderCache: Repository<Order>;
    fn order_store(&self) -> &SyncStore<Order, Self::OrderAuthority, Self::OrderCache>;
}

#[cfg(test)]
mod test {
    use kernel::interface::query::EntityQuery;
    use kernel::interface::update::{EntityModifier, StockAdjustment};
    use kernel::prelude::entity::{Author, AuthorId, BookStock, Entity, ItemQuantity};
    use kernel::KernelError;

    use crate::fixture::{author, book, TestModule};
    use crate::store::{CacheLoad, Compensation, DependOnAuthorStore, DependOnBookStore};

    #[tokio::test]
    async fn create_then_read_through_both_paths() -> error_stack::Result<(), KernelError> {
        let module = TestModule::new();
        let store = module.author_store();

        let created = store.create(&author("Ursula")).await?;
        assert!(created.entity_id().as_ref() > &0);
        assert_eq!(store.find(created.id()).await?, Some(created.clone()));
        assert_eq!(
            store.find_authoritative(created.id()).await?,
            Some(created.clone())
        );
        assert_eq!(
            store.cache().find_by_id(created.id()).await?,
            Some(created)
        );
        Ok(())
    }

    #[tokio::test]
    async fn failed_mirror_removes_authoritative_create() {
        let module = TestModule::new();
        module.author_cache_faults().fail_writes(true);

        let result = module.author_store().create(&author("Octavia")).await;
        assert!(matches!(
            result.map_err(|e| *e.current_context()),
            Err(KernelError::Internal)
        ));
        let store = module.author_store();
        assert!(store.authority().find_all().await.unwrap().is_empty());
        assert!(store.cache().find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_mirror_restores_previous_value() -> error_stack::Result<(), KernelError> {
        let module = TestModule::new();
        let store = module.author_store();
        let created = store.create(&author("Ted")).await?;

        module.author_cache_faults().fail_writes(true);
        let renamed = created
            .clone()
            .reconstruct(|a| a.first_name = kernel::prelude::entity::AuthorFirstName::new("Ed"));
        let result = store.update(created.id(), &renamed).await;
        assert!(result.is_err());
        assert_eq!(
            store.find_authoritative(created.id()).await?,
            Some(created.clone())
        );
        assert_eq!(store.cache().find_by_id(created.id()).await?, Some(created));
        Ok(())
    }

    #[tokio::test]
    async fn failed_eviction_recreates_deleted_entity() -> error_stack::Result<(), KernelError> {
        let module = TestModule::new();
        let store = module.author_store();
        let created = store.create(&author("Iain")).await?;

        module.author_cache_faults().fail_writes(true);
        assert!(store.delete(created.id()).await.is_err());
        assert_eq!(
            store.find_authoritative(created.id()).await?,
            Some(created)
        );
        Ok(())
    }

    #[tokio::test]
    async fn failed_compensation_is_internal() -> error_stack::Result<(), KernelError> {
        let module = TestModule::new();
        let store = module.author_store();
        let result = store
            .compensate(Compensation::<Author>::Remove(AuthorId::new(404)))
            .await;
        assert!(matches!(
            result.map_err(|e| *e.current_context()),
            Err(KernelError::Internal)
        ));
        Ok(())
    }

    #[tokio::test]
    async fn read_aside_backfills_cache() -> error_stack::Result<(), KernelError> {
        let module = TestModule::new();
        let store = module.author_store();
        let stored = store.authority().create(&author("Nnedi")).await?;
        assert!(store.cache().find_by_id(stored.id()).await?.is_none());

        assert_eq!(store.find(stored.id()).await?, Some(stored.clone()));
        assert_eq!(store.cache().find_by_id(stored.id()).await?, Some(stored));
        Ok(())
    }

    #[tokio::test]
    async fn backfill_failure_still_returns_value() -> error_stack::Result<(), KernelError> {
        let module = TestModule::new();
        let store = module.author_store();
        let stored = store.authority().create(&author("Becky")).await?;
        module.author_cache_faults().fail_writes(true);

        assert_eq!(store.find(stored.id()).await?, Some(stored));
        Ok(())
    }

    #[tokio::test]
    async fn deleting_missing_entity_evicts_stale_copy() -> error_stack::Result<(), KernelError> {
        let module = TestModule::new();
        let store = module.author_store();
        let stale = store.cache().create(&author("Ghost")).await?;

        let result = store.delete(stale.id()).await;
        assert!(matches!(
            result.map_err(|e| *e.current_context()),
            Err(KernelError::NotFound)
        ));
        assert!(store.cache().find_by_id(stale.id()).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn bootstrap_loads_only_empty_cache() -> error_stack::Result<(), KernelError> {
        let module = TestModule::new();
        let store = module.author_store();
        store.authority().create(&author("A")).await?;
        store.authority().create(&author("B")).await?;

        let first = store.load_cache_if_empty().await?;
        assert_eq!(first, CacheLoad::Loaded { loaded: 2, failed: 0 });

        store.authority().create(&author("C")).await?;
        let second = store.load_cache_if_empty().await?;
        assert_eq!(second, CacheLoad::Skipped { cached: 2 });
        assert_eq!(store.list().await?.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn stock_delta_reaches_both_stores() -> error_stack::Result<(), KernelError> {
        let module = TestModule::new();
        let store = module.book_store();
        let created = store.create(&book(1, 3)).await?;

        let adjustment = store
            .reserve_stock(created.id(), &ItemQuantity::new(2))
            .await?;
        assert!(matches!(adjustment, StockAdjustment::Applied(_)));
        let cached = store.cache().find_by_id(created.id()).await?.unwrap();
        let stored = store.find_authoritative(created.id()).await?.unwrap();
        assert_eq!(cached.stock(), &BookStock::new(1));
        assert_eq!(stored.stock(), &BookStock::new(1));
        Ok(())
    }

    #[tokio::test]
    async fn drifted_cache_takes_authoritative_stock() -> error_stack::Result<(), KernelError> {
        let module = TestModule::new();
        let store = module.book_store();
        let created = store.create(&book(1, 5)).await?;
        // Only the cache copy is touched.
        store
            .cache()
            .update(
                created.id(),
                &created.clone().reconstruct(|b| b.stock = BookStock::new(1)),
            )
            .await?;

        store
            .reserve_stock(created.id(), &ItemQuantity::new(2))
            .await?;
        let cached = store.cache().find_by_id(created.id()).await?.unwrap();
        assert_eq!(cached.stock(), &BookStock::new(3));
        Ok(())
    }

    #[tokio::test]
    async fn failed_cache_reservation_returns_stock() -> error_stack::Result<(), KernelError> {
        let module = TestModule::new();
        let store = module.book_store();
        let created = store.create(&book(1, 4)).await?;

        module.book_cache_faults().fail_writes(true);
        let result = store
            .reserve_stock(created.id(), &ItemQuantity::new(2))
            .await;
        assert!(result.is_err());
        let stored = store.find_authoritative(created.id()).await?.unwrap();
        assert_eq!(stored.stock(), &BookStock::new(4));
        Ok(())
    }
}
