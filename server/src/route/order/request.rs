use crate::controller::Intake;
use application::transfer::{CreateOrderDto, RequestedItem, UpdateOrderDto};
use kernel::prelude::entity::{BookId, CustomerId, ItemQuantity, OrderId, OrderStatus};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ItemRequest {
    book_id: i32,
    quantity: i32,
}

impl From<ItemRequest> for RequestedItem {
    fn from(item: ItemRequest) -> Self {
        RequestedItem {
            book_id: BookId::new(item.book_id),
            quantity: ItemQuantity::new(item.quantity),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateRequest {
    customer_id: i32,
    items: Vec<ItemRequest>,
    status: Option<OrderStatus>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    customer_id: i32,
    items: Vec<ItemRequest>,
    status: Option<OrderStatus>,
}

pub struct Transformer;

impl Intake<CreateRequest> for Transformer {
    type To = CreateOrderDto;
    fn emit(&self, input: CreateRequest) -> Self::To {
        CreateOrderDto {
            customer_id: CustomerId::new(input.customer_id),
            items: input.items.into_iter().map(RequestedItem::from).collect(),
            status: input.status,
        }
    }
}

impl Intake<(i32, UpdateRequest)> for Transformer {
    type To = UpdateOrderDto;
    fn emit(&self, input: (i32, UpdateRequest)) -> Self::To {
        let (id, input) = input;
        UpdateOrderDto {
            id: OrderId::new(id),
            customer_id: CustomerId::new(input.customer_id),
            items: input.items.into_iter().map(RequestedItem::from).collect(),
            status: input.status,
        }
    }
}
