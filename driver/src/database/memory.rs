use std::collections::BTreeMap;
use std::sync::Arc;

use error_stack::Report;
use tokio::sync::RwLock;

use kernel::interface::query::{Criteria, EntityQuery};
use kernel::interface::update::EntityModifier;
use kernel::prelude::entity::{Entity, EntityId};
use kernel::KernelError;

pub use self::{book::*, report::*};

mod book;
mod report;

/// In-process cache for one entity type. Each operation holds the table lock
/// for its whole duration; sequences of operations are not atomic.
pub struct InMemoryRepository<E: Entity> {
    table: Arc<RwLock<Table<E>>>,
}

struct Table<E: Entity> {
    rows: BTreeMap<E::Id, E>,
    next_id: i32,
}

impl<E: Entity> InMemoryRepository<E> {
    pub fn new() -> Self {
        Self {
            table: Arc::new(RwLock::new(Table {
                rows: BTreeMap::new(),
                next_id: 1,
            })),
        }
    }

    pub async fn len(&self) -> usize {
        self.table.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.table.read().await.rows.is_empty()
    }
}

impl<E: Entity> Default for InMemoryRepository<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> Clone for InMemoryRepository<E> {
    fn clone(&self) -> Self {
        Self {
            table: Arc::clone(&self.table),
        }
    }
}

#[async_trait::async_trait]
impl<E: Entity> EntityQuery<E> for InMemoryRepository<E> {
    async fn find_by_id(&self, id: &E::Id) -> error_stack::Result<Option<E>, KernelError> {
        Ok(self.table.read().await.rows.get(id).cloned())
    }

    async fn find_all(&self) -> error_stack::Result<Vec<E>, KernelError> {
        Ok(self.table.read().await.rows.values().cloned().collect())
    }

    async fn search(&self, criteria: &E::Criteria) -> error_stack::Result<Vec<E>, KernelError> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .filter(|entity| criteria.matches(entity))
            .cloned()
            .collect())
    }
}

#[async_trait::async_trait]
impl<E: Entity> EntityModifier<E> for InMemoryRepository<E> {
    async fn create(&self, entity: &E) -> error_stack::Result<E, KernelError> {
        entity.validate()?;
        let mut table = self.table.write().await;
        let requested = entity.entity_id();
        let id = if requested.is_assigned() {
            if table.rows.contains_key(&requested) {
                return Err(Report::new(KernelError::DuplicateId)
                    .attach_printable(format!("{requested} is already cached")));
            }
            table.next_id = table.next_id.max(requested.raw().saturating_add(1));
            requested
        } else {
            let id = E::Id::from_raw(table.next_id);
            table.next_id += 1;
            id
        };
        let created = entity.clone().with_id(id);
        table.rows.insert(id, created.clone());
        Ok(created)
    }

    async fn update(&self, id: &E::Id, entity: &E) -> error_stack::Result<E, KernelError> {
        let updated = entity.clone().with_id(*id);
        updated.validate()?;
        let mut table = self.table.write().await;
        match table.rows.get_mut(id) {
            Some(row) => {
                *row = updated.clone();
                Ok(updated)
            }
            None => Err(Report::new(KernelError::NotFound)
                .attach_printable(format!("{id} is not cached"))),
        }
    }

    async fn delete(&self, id: &E::Id) -> error_stack::Result<(), KernelError> {
        match self.table.write().await.rows.remove(id) {
            Some(_) => Ok(()),
            None => Err(Report::new(KernelError::NotFound)
                .attach_printable(format!("{id} is not cached"))),
        }
    }
}
