use std::collections::HashSet;

use error_stack::Report;

use kernel::prelude::entity::{AuthorId, BookId, CustomerId};
use kernel::KernelError;

use crate::store::{DependOnBookStore, DependOnOrderStore};

/// Cross-entity reference rules, evaluated against the cached view. The
/// checks are not atomic with the mutation that follows them.
#[async_trait::async_trait]
pub trait IntegrityGuard: 'static + Sync + Send + DependOnOrderStore + DependOnBookStore {
    async fn referenced_books(&self) -> error_stack::Result<HashSet<BookId>, KernelError> {
        let orders = self.order_store().list().await?;
        Ok(orders
            .iter()
            .flat_map(|order| order.items().iter().map(|item| *item.book_id()))
            .collect())
    }

    async fn ensure_book_unreferenced(&self, id: &BookId) -> error_stack::Result<(), KernelError> {
        let orders = self.order_store().list().await?;
        if let Some(order) = orders.iter().find(|order| order.references_book(id)) {
            return Err(Report::new(KernelError::Conflict)
                .attach_printable(format!("{id} is referenced by {}", order.id())));
        }
        Ok(())
    }

    async fn ensure_customer_unreferenced(
        &self,
        id: &CustomerId,
    ) -> error_stack::Result<(), KernelError> {
        let orders = self.order_store().list().await?;
        if let Some(order) = orders.iter().find(|order| order.customer_id() == id) {
            return Err(Report::new(KernelError::Conflict)
                .attach_printable(format!("{id} placed {}", order.id())));
        }
        Ok(())
    }

    async fn ensure_author_unreferenced(
        &self,
        id: &AuthorId,
    ) -> error_stack::Result<(), KernelError> {
        let books = self.book_store().list().await?;
        if let Some(book) = books.iter().find(|book| book.author_id() == id) {
            return Err(Report::new(KernelError::Conflict)
                .attach_printable(format!("{id} wrote {}", book.id())));
        }
        Ok(())
    }
}

impl<T> IntegrityGuard for T where T: DependOnOrderStore + DependOnBookStore {}
