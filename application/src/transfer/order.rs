use kernel::prelude::entity::{
    BookId, BookStock, CustomerId, ItemQuantity, Order, OrderId, OrderItem, OrderStatus,
};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct RequestedItem {
    pub book_id: BookId,
    pub quantity: ItemQuantity,
}

#[derive(Debug, Clone)]
pub struct CreateOrderDto {
    pub customer_id: CustomerId,
    pub items: Vec<RequestedItem>,
    pub status: Option<OrderStatus>,
}

#[derive(Debug, Clone)]
pub struct UpdateOrderDto {
    pub id: OrderId,
    pub customer_id: CustomerId,
    pub items: Vec<RequestedItem>,
    pub status: Option<OrderStatus>,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum DropReason {
    /// The book could not be found in either store.
    Unresolved,
    InsufficientStock { available: BookStock },
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct DroppedItem {
    pub item: RequestedItem,
    pub reason: DropReason,
}

/// Result of the reservation phase: the accepted items already hold stock.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Reservation {
    pub accepted: Vec<OrderItem>,
    pub dropped: Vec<DroppedItem>,
}

#[derive(Debug, Clone)]
pub struct OrderReceipt {
    pub order: Order,
    pub dropped: Vec<DroppedItem>,
}

impl OrderReceipt {
    pub fn dropped_count(&self) -> usize {
        self.dropped.len()
    }
}
