use crate::controller::Exhaust;
use application::transfer::{DropReason, DroppedItem, OrderReceipt};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use kernel::prelude::entity::{
    BookId, BookPrice, BookStock, CreatedAt, CustomerId, DestructOrder, ItemQuantity, Order,
    OrderId, OrderItem, OrderStatus, OrderTotal,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ItemResponse {
    book_id: BookId,
    quantity: ItemQuantity,
    unit_price: BookPrice,
}

impl From<OrderItem> for ItemResponse {
    fn from(item: OrderItem) -> Self {
        Self {
            book_id: *item.book_id(),
            quantity: *item.quantity(),
            unit_price: *item.unit_price(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    id: OrderId,
    customer_id: CustomerId,
    items: Vec<ItemResponse>,
    total: OrderTotal,
    status: OrderStatus,
    created_at: CreatedAt,
}

impl IntoResponse for OrderResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        let DestructOrder {
            id,
            customer_id,
            items,
            total,
            status,
            created_at,
        } = order.into_destruct();
        Self {
            id,
            customer_id,
            items: items.into_iter().map(ItemResponse::from).collect(),
            total,
            status,
            created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum DropResponse {
    Unresolved {
        book_id: BookId,
        quantity: ItemQuantity,
    },
    InsufficientStock {
        book_id: BookId,
        quantity: ItemQuantity,
        available: BookStock,
    },
}

impl From<DroppedItem> for DropResponse {
    fn from(dropped: DroppedItem) -> Self {
        let DroppedItem { item, reason } = dropped;
        match reason {
            DropReason::Unresolved => DropResponse::Unresolved {
                book_id: item.book_id,
                quantity: item.quantity,
            },
            DropReason::InsufficientStock { available } => DropResponse::InsufficientStock {
                book_id: item.book_id,
                quantity: item.quantity,
                available,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReceiptResponse {
    order: OrderResponse,
    dropped_count: usize,
    dropped: Vec<DropResponse>,
}

impl IntoResponse for ReceiptResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

pub struct Presenter;

impl Exhaust<OrderReceipt> for Presenter {
    type To = ReceiptResponse;
    fn emit(&self, input: OrderReceipt) -> Self::To {
        let dropped_count = input.dropped_count();
        ReceiptResponse {
            order: OrderResponse::from(input.order),
            dropped_count,
            dropped: input.dropped.into_iter().map(DropResponse::from).collect(),
        }
    }
}

impl Exhaust<Order> for Presenter {
    type To = OrderResponse;
    fn emit(&self, input: Order) -> Self::To {
        OrderResponse::from(input)
    }
}

impl Exhaust<Vec<Order>> for Presenter {
    type To = Json<Vec<OrderResponse>>;
    fn emit(&self, input: Vec<Order>) -> Self::To {
        Json(input.into_iter().map(OrderResponse::from).collect())
    }
}

impl Exhaust<()> for Presenter {
    type To = StatusCode;
    fn emit(&self, _: ()) -> Self::To {
        StatusCode::NO_CONTENT
    }
}
