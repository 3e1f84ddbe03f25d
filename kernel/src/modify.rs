mod book;
mod report;
mod review;

pub use self::{book::*, report::*, review::*};
use crate::entity::Entity;
use crate::query::EntityQuery;
use crate::KernelError;

#[async_trait::async_trait]
pub trait EntityModifier<E: Entity>: 'static + Sync + Send {
    /// Inserts the entity. A zero id is assigned by the store; a nonzero id is
    /// kept when free and rejected with `DuplicateId` otherwise.
    async fn create(&self, entity: &E) -> error_stack::Result<E, KernelError>;
    /// Replaces every mutable field. The stored id wins over the payload id.
    async fn update(&self, id: &E::Id, entity: &E) -> error_stack::Result<E, KernelError>;
    async fn delete(&self, id: &E::Id) -> error_stack::Result<(), KernelError>;
}

pub trait Repository<E: Entity>: EntityQuery<E> + EntityModifier<E> {}

impl<E: Entity, T> Repository<E> for T where T: EntityQuery<E> + EntityModifier<E> {}
