mod address;
mod email;
mod id;
mod name;
mod password;
mod role;

pub use self::{address::*, email::*, id::*, name::*, password::*, role::*};
use crate::entity::common::{invalid, CreatedAt, Entity, EntityId};
use crate::query::CustomerCriteria;
use crate::KernelError;
use destructure::{Destructure, Mutation};
use vodca::References;

#[derive(Debug, Clone, Eq, PartialEq, References, Destructure, Mutation)]
pub struct Customer {
    id: CustomerId,
    name: CustomerName,
    username: CustomerUsername,
    email: CustomerEmail,
    password: CustomerPassword,
    address: Address,
    role: CustomerRole,
    created_at: CreatedAt,
}

impl Customer {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: CustomerId,
        name: CustomerName,
        username: CustomerUsername,
        email: CustomerEmail,
        password: CustomerPassword,
        address: Address,
        role: CustomerRole,
        created_at: CreatedAt,
    ) -> Self {
        Self {
            id,
            name,
            username,
            email,
            password,
            address,
            role,
            created_at,
        }
    }
}

impl Entity for Customer {
    type Id = CustomerId;
    type Criteria = CustomerCriteria;
    const KIND: &'static str = "customer";

    fn entity_id(&self) -> Self::Id {
        self.id
    }

    fn with_id(self, id: Self::Id) -> Self {
        self.reconstruct(|c| c.id = id)
    }

    fn validate(&self) -> error_stack::Result<(), KernelError> {
        self.id.ensure_valid()?;
        if self.username.as_ref().trim().is_empty() {
            return Err(invalid(Self::KIND, "username is required"));
        }
        if !self.email.is_well_formed() {
            return Err(invalid(
                Self::KIND,
                format!("malformed email {}", self.email.as_ref()),
            ));
        }
        Ok(())
    }
}
