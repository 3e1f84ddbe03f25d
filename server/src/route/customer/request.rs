use crate::controller::Intake;
use application::transfer::{CreateCustomerDto, UpdateCustomerDto, VerifyCustomerDto};
use kernel::prelude::entity::{Address, CustomerId, CustomerRole};
use serde::Deserialize;

#[derive(Deserialize)]
pub struct CreateRequest {
    name: String,
    username: String,
    email: String,
    password: String,
    #[serde(default)]
    address: Address,
    #[serde(default)]
    role: CustomerRole,
}

/// Omitting `password` keeps the current one.
#[derive(Deserialize)]
pub struct UpdateRequest {
    name: String,
    username: String,
    email: String,
    password: Option<String>,
    #[serde(default)]
    address: Address,
    #[serde(default)]
    role: CustomerRole,
}

#[derive(Deserialize)]
pub struct VerifyRequest {
    email: String,
    password: String,
}

pub struct Transformer;

impl Intake<CreateRequest> for Transformer {
    type To = CreateCustomerDto;
    fn emit(&self, input: CreateRequest) -> Self::To {
        CreateCustomerDto {
            name: input.name,
            username: input.username,
            email: input.email,
            password: input.password,
            address: input.address,
            role: input.role,
        }
    }
}

impl Intake<(i32, UpdateRequest)> for Transformer {
    type To = UpdateCustomerDto;
    fn emit(&self, input: (i32, UpdateRequest)) -> Self::To {
        let (id, input) = input;
        UpdateCustomerDto {
            id: CustomerId::new(id),
            name: input.name,
            username: input.username,
            email: input.email,
            password: input.password,
            address: input.address,
            role: input.role,
        }
    }
}

impl Intake<VerifyRequest> for Transformer {
    type To = VerifyCustomerDto;
    fn emit(&self, input: VerifyRequest) -> Self::To {
        VerifyCustomerDto {
            email: input.email,
            password: input.password,
        }
    }
}
