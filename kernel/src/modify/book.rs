use crate::entity::{Book, BookId, BookStock, ItemQuantity};
use crate::KernelError;

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum StockAdjustment {
    Applied(Book),
    Insufficient(BookStock),
    Missing,
}

/// Stock changes whose check and write happen in one critical section.
#[async_trait::async_trait]
pub trait StockModifier: 'static + Sync + Send {
    async fn reserve(
        &self,
        id: &BookId,
        quantity: &ItemQuantity,
    ) -> error_stack::Result<StockAdjustment, KernelError>;
    async fn release(
        &self,
        id: &BookId,
        quantity: &ItemQuantity,
    ) -> error_stack::Result<StockAdjustment, KernelError>;
}
