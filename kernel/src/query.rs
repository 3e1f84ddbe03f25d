mod author;
mod book;
mod customer;
mod order;
mod report;
mod review;

use std::fmt::Debug;

pub use self::{author::*, book::*, customer::*, order::*, report::*, review::*};
use crate::entity::Entity;
use crate::KernelError;

/// Pure inclusion predicate. The default value matches every entity.
pub trait Criteria<E>: 'static + Debug + Default + Clone + Sync + Send {
    fn matches(&self, entity: &E) -> bool;
}

#[async_trait::async_trait]
pub trait EntityQuery<E: Entity>: 'static + Sync + Send {
    async fn find_by_id(&self, id: &E::Id) -> error_stack::Result<Option<E>, KernelError>;
    async fn find_all(&self) -> error_stack::Result<Vec<E>, KernelError>;
    async fn search(&self, criteria: &E::Criteria) -> error_stack::Result<Vec<E>, KernelError>;
}

pub(crate) fn any_of<T: PartialEq>(accepted: &[T], value: &T) -> bool {
    accepted.is_empty() || accepted.contains(value)
}

pub(crate) fn within<T: PartialOrd>(min: Option<&T>, max: Option<&T>, value: &T) -> bool {
    min.map_or(true, |min| value >= min) && max.map_or(true, |max| value <= max)
}
