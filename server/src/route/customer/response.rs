use crate::controller::Exhaust;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use kernel::prelude::entity::{
    Address, CreatedAt, Customer, CustomerEmail, CustomerId, CustomerName, CustomerRole,
    CustomerUsername, DestructCustomer,
};
use serde::Serialize;

/// Public view of a customer. The password hash never leaves the process.
#[derive(Debug, Serialize)]
pub struct CustomerResponse {
    id: CustomerId,
    name: CustomerName,
    username: CustomerUsername,
    email: CustomerEmail,
    address: Address,
    role: CustomerRole,
    created_at: CreatedAt,
}

impl IntoResponse for CustomerResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

impl From<Customer> for CustomerResponse {
    fn from(customer: Customer) -> Self {
        let DestructCustomer {
            id,
            name,
            username,
            email,
            address,
            role,
            created_at,
            ..
        } = customer.into_destruct();
        Self {
            id,
            name,
            username,
            email,
            address,
            role,
            created_at,
        }
    }
}

pub struct Presenter;

impl Exhaust<Customer> for Presenter {
    type To = CustomerResponse;
    fn emit(&self, input: Customer) -> Self::To {
        CustomerResponse::from(input)
    }
}

impl Exhaust<Vec<Customer>> for Presenter {
    type To = Json<Vec<CustomerResponse>>;
    fn emit(&self, input: Vec<Customer>) -> Self::To {
        Json(input.into_iter().map(CustomerResponse::from).collect())
    }
}

impl Exhaust<Option<Customer>> for Presenter {
    type To = Response;
    fn emit(&self, input: Option<Customer>) -> Self::To {
        input
            .map(|customer| CustomerResponse::from(customer).into_response())
            .unwrap_or_else(|| StatusCode::UNAUTHORIZED.into_response())
    }
}

impl Exhaust<()> for Presenter {
    type To = StatusCode;
    fn emit(&self, _: ()) -> Self::To {
        StatusCode::NO_CONTENT
    }
}
