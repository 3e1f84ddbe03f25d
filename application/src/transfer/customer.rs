use kernel::prelude::entity::{Address, CustomerId, CustomerRole};

#[derive(Clone)]
pub struct CreateCustomerDto {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub address: Address,
    pub role: CustomerRole,
}

/// `password: None` keeps the stored hash.
#[derive(Clone)]
pub struct UpdateCustomerDto {
    pub id: CustomerId,
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: Option<String>,
    pub address: Address,
    pub role: CustomerRole,
}

#[derive(Clone)]
pub struct VerifyCustomerDto {
    pub email: String,
    pub password: String,
}
