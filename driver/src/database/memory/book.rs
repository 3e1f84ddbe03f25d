use kernel::interface::update::{StockAdjustment, StockModifier};
use kernel::prelude::entity::{Book, BookId, ItemQuantity};
use kernel::KernelError;

use crate::database::InMemoryRepository;

#[async_trait::async_trait]
impl StockModifier for InMemoryRepository<Book> {
    async fn reserve(
        &self,
        id: &BookId,
        quantity: &ItemQuantity,
    ) -> error_stack::Result<StockAdjustment, KernelError> {
        let mut table = self.table.write().await;
        let Some(book) = table.rows.get_mut(id) else {
            return Ok(StockAdjustment::Missing);
        };
        match book.stock().take(quantity) {
            Some(stock) => {
                book.substitute(|book| *book.stock = stock);
                Ok(StockAdjustment::Applied(book.clone()))
            }
            None => Ok(StockAdjustment::Insufficient(*book.stock())),
        }
    }

    async fn release(
        &self,
        id: &BookId,
        quantity: &ItemQuantity,
    ) -> error_stack::Result<StockAdjustment, KernelError> {
        let mut table = self.table.write().await;
        let Some(book) = table.rows.get_mut(id) else {
            return Ok(StockAdjustment::Missing);
        };
        let stock = book.stock().restore(quantity);
        book.substitute(|book| *book.stock = stock);
        Ok(StockAdjustment::Applied(book.clone()))
    }
}
