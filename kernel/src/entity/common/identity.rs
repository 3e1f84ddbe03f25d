use std::fmt::{Debug, Display};
use std::hash::Hash;

use error_stack::Report;

use crate::query::Criteria;
use crate::KernelError;

/// Integer identity of a stored entity. `0` means "not yet assigned".
pub trait EntityId: 'static + Copy + Eq + Hash + Ord + Debug + Display + Sync + Send {
    fn from_raw(raw: i32) -> Self;
    fn raw(&self) -> i32;

    fn is_assigned(&self) -> bool {
        self.raw() > 0
    }

    fn ensure_valid(&self) -> error_stack::Result<(), KernelError> {
        if self.raw() < 0 {
            return Err(Report::new(KernelError::Validation)
                .attach_printable(format!("Negative id is not allowed: {}", self.raw())));
        }
        Ok(())
    }
}

pub trait Entity: 'static + Clone + Debug + Sync + Send {
    type Id: EntityId;
    type Criteria: Criteria<Self>;
    const KIND: &'static str;

    fn entity_id(&self) -> Self::Id;
    fn with_id(self, id: Self::Id) -> Self;

    fn validate(&self) -> error_stack::Result<(), KernelError> {
        self.entity_id().ensure_valid()
    }
}

pub(crate) fn invalid(kind: &str, reason: impl Into<String>) -> Report<KernelError> {
    Report::new(KernelError::Validation).attach_printable(format!("{kind}: {}", reason.into()))
}
