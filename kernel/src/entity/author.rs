mod biography;
mod id;
mod name;

pub use self::{biography::*, id::*, name::*};
use crate::entity::common::{invalid, Entity, EntityId};
use crate::query::AuthorCriteria;
use crate::KernelError;
use destructure::{Destructure, Mutation};
use vodca::References;

#[derive(Debug, Clone, Eq, PartialEq, References, Destructure, Mutation)]
pub struct Author {
    id: AuthorId,
    first_name: AuthorFirstName,
    last_name: AuthorLastName,
    bio: AuthorBiography,
}

impl Author {
    pub fn new(
        id: AuthorId,
        first_name: AuthorFirstName,
        last_name: AuthorLastName,
        bio: AuthorBiography,
    ) -> Self {
        Self {
            id,
            first_name,
            last_name,
            bio,
        }
    }
}

impl Entity for Author {
    type Id = AuthorId;
    type Criteria = AuthorCriteria;
    const KIND: &'static str = "author";

    fn entity_id(&self) -> Self::Id {
        self.id
    }

    fn with_id(self, id: Self::Id) -> Self {
        self.reconstruct(|a| a.id = id)
    }

    fn validate(&self) -> error_stack::Result<(), KernelError> {
        self.id.ensure_valid()?;
        if self.first_name.as_ref().trim().is_empty() || self.last_name.as_ref().trim().is_empty()
        {
            return Err(invalid(Self::KIND, "first and last name are required"));
        }
        Ok(())
    }
}
