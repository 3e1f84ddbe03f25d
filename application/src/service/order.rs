use error_stack::Report;
use uuid::Uuid;

use kernel::interface::query::OrderCriteria;
use kernel::interface::update::StockAdjustment;
use kernel::prelude::entity::{CreatedAt, Order, OrderId, OrderItem};
use kernel::KernelError;

use crate::store::{DependOnBookStore, DependOnCustomerStore, DependOnOrderStore};
use crate::transfer::{
    CreateOrderDto, DropReason, DroppedItem, OrderReceipt, RequestedItem, Reservation,
    UpdateOrderDto,
};

#[async_trait::async_trait]
pub trait GetOrderService: 'static + Sync + Send + DependOnOrderStore {
    async fn get_order(&self, id: &OrderId) -> error_stack::Result<Order, KernelError> {
        self.order_store().get(id).await
    }

    async fn get_all_orders(&self) -> error_stack::Result<Vec<Order>, KernelError> {
        self.order_store().list().await
    }

    async fn search_orders(
        &self,
        criteria: &OrderCriteria,
    ) -> error_stack::Result<Vec<Order>, KernelError> {
        self.order_store().search(criteria).await
    }
}

impl<T> GetOrderService for T where T: DependOnOrderStore {}

/// Stock reservation phase of an order attempt. Each accepted item is taken
/// with its own conditional write, so a failure part way leaves the earlier
/// items reserved; they are logged under the attempt id.
#[async_trait::async_trait]
pub trait ReserveStockService: 'static + Sync + Send + DependOnBookStore {
    async fn reserve_items(
        &self,
        attempt: &Uuid,
        items: &[RequestedItem],
    ) -> error_stack::Result<Reservation, KernelError> {
        let mut reservation = Reservation::default();
        for requested in items {
            let Some(book) = self.book_store().find(&requested.book_id).await? else {
                tracing::debug!(%attempt, book = %requested.book_id, "dropping unknown book");
                reservation.dropped.push(DroppedItem {
                    item: *requested,
                    reason: DropReason::Unresolved,
                });
                continue;
            };
            if !book.stock().can_supply(&requested.quantity) {
                tracing::debug!(
                    %attempt,
                    book = %requested.book_id,
                    quantity = requested.quantity.as_ref(),
                    stock = book.stock().as_ref(),
                    "dropping item beyond stock"
                );
                reservation.dropped.push(DroppedItem {
                    item: *requested,
                    reason: DropReason::InsufficientStock {
                        available: *book.stock(),
                    },
                });
                continue;
            }

            let adjustment = self
                .book_store()
                .reserve_stock(&requested.book_id, &requested.quantity)
                .await;
            match adjustment {
                Ok(StockAdjustment::Applied(book)) => reservation.accepted.push(OrderItem::new(
                    *book.id(),
                    requested.quantity,
                    *book.price(),
                )),
                // Lost a race against another reservation.
                Ok(StockAdjustment::Insufficient(available)) => {
                    reservation.dropped.push(DroppedItem {
                        item: *requested,
                        reason: DropReason::InsufficientStock { available },
                    })
                }
                Ok(StockAdjustment::Missing) => reservation.dropped.push(DroppedItem {
                    item: *requested,
                    reason: DropReason::Unresolved,
                }),
                Err(report) => {
                    log_unreconciled(attempt, &reservation.accepted);
                    return Err(report.attach_printable(format!(
                        "reservation attempt {attempt} aborted at {}",
                        requested.book_id
                    )));
                }
            }
        }
        Ok(reservation)
    }

    /// Returns stock for every item. Best effort: books that no longer exist
    /// are skipped and failures are logged, never raised.
    async fn release_items(&self, attempt: &Uuid, items: &[OrderItem]) {
        for item in items {
            match self
                .book_store()
                .release_stock(item.book_id(), item.quantity())
                .await
            {
                Ok(StockAdjustment::Applied(_)) => {}
                Ok(other) => tracing::warn!(
                    %attempt,
                    book = %item.book_id(),
                    ?other,
                    "stock not returned, book is gone"
                ),
                Err(report) => tracing::error!(
                    %attempt,
                    book = %item.book_id(),
                    quantity = item.quantity().as_ref(),
                    "stock not returned: {report:?}"
                ),
            }
        }
    }

    /// Reserves again the stock of items that were released for an order
    /// which survived. Items that cannot be taken back are logged.
    async fn retake_items(&self, attempt: &Uuid, items: &[OrderItem]) {
        for item in items {
            match self
                .book_store()
                .reserve_stock(item.book_id(), item.quantity())
                .await
            {
                Ok(StockAdjustment::Applied(_)) => {}
                Ok(other) => tracing::error!(
                    %attempt,
                    book = %item.book_id(),
                    quantity = item.quantity().as_ref(),
                    ?other,
                    "released stock could not be taken back for a surviving order"
                ),
                Err(report) => tracing::error!(
                    %attempt,
                    book = %item.book_id(),
                    quantity = item.quantity().as_ref(),
                    "released stock could not be taken back for a surviving order: {report:?}"
                ),
            }
        }
    }
}

impl<T> ReserveStockService for T where T: DependOnBookStore {}

#[async_trait::async_trait]
pub trait CreateOrderService:
    'static + Sync + Send + DependOnCustomerStore + DependOnOrderStore + ReserveStockService
{
    async fn create_order(
        &self,
        dto: CreateOrderDto,
    ) -> error_stack::Result<OrderReceipt, KernelError> {
        let attempt = Uuid::new_v4();
        let CreateOrderDto {
            customer_id,
            items,
            status,
        } = dto;
        self.customer_store().get(&customer_id).await?;
        ensure_quantities(&items)?;

        let Reservation { accepted, dropped } = self.reserve_items(&attempt, &items).await?;
        if accepted.is_empty() {
            return Err(no_valid_items(&attempt, dropped.len()));
        }

        let order = Order::place(
            OrderId::new(0),
            customer_id,
            accepted,
            status.unwrap_or_default(),
            CreatedAt::now(),
        );
        match self.order_store().create(&order).await {
            Ok(order) => {
                tracing::info!(
                    %attempt,
                    order = %order.id(),
                    dropped = dropped.len(),
                    "order created"
                );
                Ok(OrderReceipt { order, dropped })
            }
            Err(report) => {
                log_unreconciled(&attempt, order.items());
                Err(report)
            }
        }
    }
}

impl<T> CreateOrderService for T where
    T: DependOnCustomerStore + DependOnOrderStore + ReserveStockService
{
}

#[async_trait::async_trait]
pub trait UpdateOrderService:
    'static + Sync + Send + DependOnCustomerStore + DependOnOrderStore + ReserveStockService
{
    async fn update_order(
        &self,
        dto: UpdateOrderDto,
    ) -> error_stack::Result<OrderReceipt, KernelError> {
        let attempt = Uuid::new_v4();
        let UpdateOrderDto {
            id,
            customer_id,
            items,
            status,
        } = dto;
        let existing = self.order_store().get(&id).await?;
        ensure_mutable(&existing)?;
        self.customer_store().get(&customer_id).await?;
        ensure_quantities(&items)?;

        // The previous reservation is returned before the new items are weighed.
        self.release_items(&attempt, existing.items()).await;

        let Reservation { accepted, dropped } = match self.reserve_items(&attempt, &items).await {
            Ok(reservation) => reservation,
            Err(report) => {
                // The order still holds its previous items.
                self.retake_items(&attempt, existing.items()).await;
                return Err(report);
            }
        };
        if accepted.is_empty() {
            tracing::error!(
                %attempt,
                order = %id,
                "order kept its items but their stock was already returned"
            );
            return Err(no_valid_items(&attempt, dropped.len()));
        }

        let order = Order::place(
            id,
            customer_id,
            accepted,
            status.unwrap_or(*existing.status()),
            *existing.created_at(),
        );
        match self.order_store().update(&id, &order).await {
            Ok(order) => {
                tracing::info!(%attempt, order = %id, dropped = dropped.len(), "order updated");
                Ok(OrderReceipt { order, dropped })
            }
            Err(report) => {
                reconcile_failed_write(self, &attempt, &id, existing.items(), order.items()).await;
                Err(report)
            }
        }
    }
}

impl<T> UpdateOrderService for T where
    T: DependOnCustomerStore + DependOnOrderStore + ReserveStockService
{
}

#[async_trait::async_trait]
pub trait DeleteOrderService: 'static + Sync + Send + DependOnOrderStore + ReserveStockService {
    /// Returns the order's stock, then deletes it. If the delete fails and the
    /// order survives, its stock is reserved again.
    ///
    /// Nothing serializes two deletes of the same order: both can release the
    /// items before either delete lands, returning the stock twice.
    async fn delete_order(&self, id: &OrderId) -> error_stack::Result<(), KernelError> {
        let attempt = Uuid::new_v4();
        let order = self.order_store().get(id).await?;
        ensure_mutable(&order)?;
        self.release_items(&attempt, order.items()).await;
        if let Err(report) = self.order_store().delete(id).await {
            reconcile_failed_write(self, &attempt, id, order.items(), &[]).await;
            return Err(report);
        }
        tracing::info!(%attempt, order = %id, "order deleted");
        Ok(())
    }
}

impl<T> DeleteOrderService for T where T: DependOnOrderStore + ReserveStockService {}

fn ensure_quantities(items: &[RequestedItem]) -> error_stack::Result<(), KernelError> {
    match items.iter().find(|item| !item.quantity.is_positive()) {
        Some(item) => Err(Report::new(KernelError::Validation).attach_printable(format!(
            "quantity {} of {} is below 1",
            item.quantity.as_ref(),
            item.book_id
        ))),
        None => Ok(()),
    }
}

fn ensure_mutable(order: &Order) -> error_stack::Result<(), KernelError> {
    if order.is_settled() {
        return Err(Report::new(KernelError::Conflict)
            .attach_printable(format!("{} is already successful", order.id())));
    }
    Ok(())
}

fn no_valid_items(attempt: &Uuid, dropped: usize) -> Report<KernelError> {
    Report::new(KernelError::NoValidItems)
        .attach_printable(format!("attempt {attempt} dropped all {dropped} items"))
}

/// Brings stock back in line with whatever the authoritative store kept after
/// a failed order write. `released` is the stock returned before the write,
/// `reserved` the stock taken for the items the write tried to store.
async fn reconcile_failed_write<T>(
    module: &T,
    attempt: &Uuid,
    id: &OrderId,
    released: &[OrderItem],
    reserved: &[OrderItem],
) where
    T: DependOnOrderStore + ReserveStockService + ?Sized,
{
    match module.order_store().find_authoritative(id).await {
        // The write landed even though the call failed.
        Ok(Some(kept)) if kept.items() == reserved => {}
        Ok(Some(kept)) => {
            module.release_items(attempt, reserved).await;
            module.retake_items(attempt, kept.items()).await;
        }
        Ok(None) => log_unreconciled(attempt, reserved),
        Err(report) => {
            tracing::error!(
                %attempt,
                order = %id,
                "order state unknown after failed write: {report:?}"
            );
            log_unreconciled(attempt, reserved);
            for item in released {
                tracing::error!(
                    %attempt,
                    book = %item.book_id(),
                    quantity = item.quantity().as_ref(),
                    "released stock may still be claimed by the order"
                );
            }
        }
    }
}

fn log_unreconciled(attempt: &Uuid, items: &[OrderItem]) {
    for item in items {
        tracing::error!(
            %attempt,
            book = %item.book_id(),
            quantity = item.quantity().as_ref(),
            "reserved stock is not backed by an order"
        );
    }
}

#[cfg(test)]
mod test {
    use kernel::interface::query::EntityQuery;
    use kernel::prelude::entity::{
        Book, BookId, BookStock, CustomerId, Entity, ItemQuantity, OrderStatus,
    };
    use kernel::KernelError;

    use crate::fixture::{book, customer, TestModule};
    use crate::service::{CreateOrderService, DeleteOrderService, UpdateOrderService};
    use crate::store::{DependOnBookStore, DependOnCustomerStore, DependOnOrderStore};
    use crate::transfer::{CreateOrderDto, DropReason, RequestedItem, UpdateOrderDto};

    fn item(book: &Book, quantity: i32) -> RequestedItem {
        RequestedItem {
            book_id: *book.id(),
            quantity: ItemQuantity::new(quantity),
        }
    }

    async fn stock(module: &TestModule, id: &BookId) -> BookStock {
        let store = module.book_store();
        let stored = store.find_authoritative(id).await.unwrap().unwrap();
        let cached = store.cache().find_by_id(id).await.unwrap().unwrap();
        assert_eq!(stored.stock(), cached.stock(), "stores disagree on {id}");
        *stored.stock()
    }

    async fn setup(stocks: &[i32]) -> (TestModule, CustomerId, Vec<Book>) {
        let module = TestModule::new();
        let customer = module
            .customer_store()
            .create(&customer("reader@example.com"))
            .await
            .unwrap();
        let mut books = Vec::new();
        for stock in stocks {
            books.push(module.book_store().create(&book(1, *stock)).await.unwrap());
        }
        (module, *customer.id(), books)
    }

    fn create(customer_id: CustomerId, items: Vec<RequestedItem>) -> CreateOrderDto {
        CreateOrderDto {
            customer_id,
            items,
            status: None,
        }
    }

    #[tokio::test]
    async fn oversized_item_is_dropped_without_touching_stock() {
        let (module, customer_id, books) = setup(&[3, 10]).await;

        let only = module
            .create_order(create(customer_id, vec![item(&books[0], 5)]))
            .await;
        assert!(matches!(
            only.map_err(|e| *e.current_context()),
            Err(KernelError::NoValidItems)
        ));
        assert_eq!(stock(&module, books[0].id()).await, BookStock::new(3));

        let receipt = module
            .create_order(create(
                customer_id,
                vec![item(&books[0], 5), item(&books[1], 2)],
            ))
            .await
            .unwrap();
        assert_eq!(receipt.dropped_count(), 1);
        assert_eq!(
            receipt.dropped[0].reason,
            DropReason::InsufficientStock {
                available: BookStock::new(3)
            }
        );
        assert_eq!(receipt.order.items().len(), 1);
        assert_eq!(receipt.order.status(), &OrderStatus::Pending);
        assert_eq!(stock(&module, books[0].id()).await, BookStock::new(3));
        assert_eq!(stock(&module, books[1].id()).await, BookStock::new(8));
    }

    #[tokio::test]
    async fn unknown_books_are_dropped() {
        let (module, customer_id, books) = setup(&[2]).await;
        let receipt = module
            .create_order(create(
                customer_id,
                vec![
                    RequestedItem {
                        book_id: BookId::new(999),
                        quantity: ItemQuantity::new(1),
                    },
                    item(&books[0], 2),
                ],
            ))
            .await
            .unwrap();
        assert_eq!(receipt.dropped[0].reason, DropReason::Unresolved);
        assert_eq!(stock(&module, books[0].id()).await, BookStock::new(0));

        // Empty stock supplies nothing.
        let empty = module
            .create_order(create(customer_id, vec![item(&books[0], 1)]))
            .await;
        assert!(matches!(
            empty.map_err(|e| *e.current_context()),
            Err(KernelError::NoValidItems)
        ));
    }

    #[tokio::test]
    async fn total_uses_reserved_unit_prices() {
        let (module, customer_id, books) = setup(&[5]).await;
        let receipt = module
            .create_order(create(customer_id, vec![item(&books[0], 3)]))
            .await
            .unwrap();
        assert_eq!(
            *receipt.order.total().as_ref(),
            *books[0].price().as_ref() * rust_decimal::Decimal::from(3)
        );
    }

    #[tokio::test]
    async fn rejects_before_touching_stock() {
        let (module, customer_id, books) = setup(&[5]).await;

        let unknown = module
            .create_order(create(CustomerId::new(77), vec![item(&books[0], 1)]))
            .await;
        assert!(matches!(
            unknown.map_err(|e| *e.current_context()),
            Err(KernelError::NotFound)
        ));

        let zero = module
            .create_order(create(
                customer_id,
                vec![item(&books[0], 1), item(&books[0], 0)],
            ))
            .await;
        assert!(matches!(
            zero.map_err(|e| *e.current_context()),
            Err(KernelError::Validation)
        ));
        assert_eq!(stock(&module, books[0].id()).await, BookStock::new(5));
    }

    #[tokio::test]
    async fn deleting_pending_order_restores_stock() {
        let (module, customer_id, books) = setup(&[4, 4]).await;
        let receipt = module
            .create_order(create(
                customer_id,
                vec![item(&books[0], 3), item(&books[1], 1)],
            ))
            .await
            .unwrap();

        module.delete_order(receipt.order.id()).await.unwrap();
        assert_eq!(stock(&module, books[0].id()).await, BookStock::new(4));
        assert_eq!(stock(&module, books[1].id()).await, BookStock::new(4));
        assert!(module
            .order_store()
            .find(receipt.order.id())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn successful_orders_are_frozen() {
        let (module, customer_id, books) = setup(&[4]).await;
        let receipt = module
            .create_order(CreateOrderDto {
                customer_id,
                items: vec![item(&books[0], 1)],
                status: Some(OrderStatus::Success),
            })
            .await
            .unwrap();
        let id = *receipt.order.id();

        let deleted = module.delete_order(&id).await;
        assert!(matches!(
            deleted.map_err(|e| *e.current_context()),
            Err(KernelError::Conflict)
        ));
        let updated = module
            .update_order(UpdateOrderDto {
                id,
                customer_id,
                items: vec![item(&books[0], 2)],
                status: None,
            })
            .await;
        assert!(matches!(
            updated.map_err(|e| *e.current_context()),
            Err(KernelError::Conflict)
        ));
        assert_eq!(stock(&module, books[0].id()).await, BookStock::new(3));
    }

    #[tokio::test]
    async fn update_moves_reservation() {
        let (module, customer_id, books) = setup(&[5, 5]).await;
        let receipt = module
            .create_order(create(customer_id, vec![item(&books[0], 2)]))
            .await
            .unwrap();
        assert_eq!(stock(&module, books[0].id()).await, BookStock::new(3));

        let updated = module
            .update_order(UpdateOrderDto {
                id: *receipt.order.id(),
                customer_id,
                items: vec![item(&books[1], 1)],
                status: None,
            })
            .await
            .unwrap();
        assert_eq!(stock(&module, books[0].id()).await, BookStock::new(5));
        assert_eq!(stock(&module, books[1].id()).await, BookStock::new(4));
        assert_eq!(updated.order.created_at(), receipt.order.created_at());
        assert_eq!(updated.order.entity_id(), receipt.order.entity_id());
    }

    #[tokio::test]
    async fn stock_never_goes_negative() {
        let (module, customer_id, books) = setup(&[3]).await;
        let mut placed = Vec::new();
        for quantity in [2, 2, 1, 1] {
            if let Ok(receipt) = module
                .create_order(create(customer_id, vec![item(&books[0], quantity)]))
                .await
            {
                placed.push(receipt.order);
            }
            assert!(stock(&module, books[0].id()).await.as_ref() >= &0);
        }
        assert_eq!(stock(&module, books[0].id()).await, BookStock::new(0));
        assert_eq!(placed.len(), 2);

        module
            .update_order(UpdateOrderDto {
                id: *placed[0].id(),
                customer_id,
                items: vec![item(&books[0], 2)],
                status: None,
            })
            .await
            .unwrap();
        assert_eq!(stock(&module, books[0].id()).await, BookStock::new(0));
        for order in &placed {
            module.delete_order(order.id()).await.unwrap();
        }
        assert_eq!(stock(&module, books[0].id()).await, BookStock::new(3));
    }

    #[tokio::test]
    async fn failed_order_mirror_leaves_no_order() {
        let (module, customer_id, books) = setup(&[5]).await;
        module.order_cache_faults().fail_writes(true);

        let result = module
            .create_order(create(customer_id, vec![item(&books[0], 1)]))
            .await;
        assert!(matches!(
            result.map_err(|e| *e.current_context()),
            Err(KernelError::Internal)
        ));
        let store = module.order_store();
        assert!(store.authority().find_all().await.unwrap().is_empty());
        assert!(store.cache().find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_delete_keeps_order_reserved() {
        let (module, customer_id, books) = setup(&[5]).await;
        let receipt = module
            .create_order(create(customer_id, vec![item(&books[0], 2)]))
            .await
            .unwrap();
        let id = *receipt.order.id();

        module.order_cache_faults().fail_writes(true);
        let deleted = module.delete_order(&id).await;
        assert!(matches!(
            deleted.map_err(|e| *e.current_context()),
            Err(KernelError::Internal)
        ));
        assert!(module
            .order_store()
            .find_authoritative(&id)
            .await
            .unwrap()
            .is_some());
        assert_eq!(stock(&module, books[0].id()).await, BookStock::new(3));

        // A retry returns the stock exactly once.
        module.order_cache_faults().fail_writes(false);
        module.delete_order(&id).await.unwrap();
        assert_eq!(stock(&module, books[0].id()).await, BookStock::new(5));
    }

    #[tokio::test]
    async fn failed_update_keeps_previous_reservation() {
        let (module, customer_id, books) = setup(&[5, 5]).await;
        let receipt = module
            .create_order(create(customer_id, vec![item(&books[0], 2)]))
            .await
            .unwrap();
        let id = *receipt.order.id();

        module.order_cache_faults().fail_writes(true);
        let updated = module
            .update_order(UpdateOrderDto {
                id,
                customer_id,
                items: vec![item(&books[1], 1)],
                status: None,
            })
            .await;
        assert!(matches!(
            updated.map_err(|e| *e.current_context()),
            Err(KernelError::Internal)
        ));
        let kept = module
            .order_store()
            .find_authoritative(&id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(kept.items(), receipt.order.items());
        assert_eq!(stock(&module, books[0].id()).await, BookStock::new(3));
        assert_eq!(stock(&module, books[1].id()).await, BookStock::new(5));

        module.order_cache_faults().fail_writes(false);
        module.delete_order(&id).await.unwrap();
        assert_eq!(stock(&module, books[0].id()).await, BookStock::new(5));
        assert_eq!(stock(&module, books[1].id()).await, BookStock::new(5));
    }

    #[tokio::test]
    async fn aborted_reservation_keeps_earlier_items() {
        let (module, customer_id, books) = setup(&[5, 5]).await;

        // The first cache reservation goes through, the second one fails.
        module.book_cache_faults().fail_after(1);
        let result = module
            .create_order(create(
                customer_id,
                vec![item(&books[0], 2), item(&books[1], 1)],
            ))
            .await;
        assert!(matches!(
            result.map_err(|e| *e.current_context()),
            Err(KernelError::Internal)
        ));

        module.book_cache_faults().fail_writes(false);
        assert_eq!(stock(&module, books[0].id()).await, BookStock::new(3));
        assert_eq!(stock(&module, books[1].id()).await, BookStock::new(5));
        assert!(module
            .order_store()
            .authority()
            .find_all()
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn update_without_valid_items_has_released_stock() {
        let (module, customer_id, books) = setup(&[5, 1]).await;
        let receipt = module
            .create_order(create(customer_id, vec![item(&books[0], 2)]))
            .await
            .unwrap();
        let id = *receipt.order.id();

        let updated = module
            .update_order(UpdateOrderDto {
                id,
                customer_id,
                items: vec![item(&books[1], 4)],
                status: None,
            })
            .await;
        assert!(matches!(
            updated.map_err(|e| *e.current_context()),
            Err(KernelError::NoValidItems)
        ));
        let kept = module.order_store().get(&id).await.unwrap();
        assert_eq!(kept.items(), receipt.order.items());
        assert_eq!(stock(&module, books[0].id()).await, BookStock::new(5));
        assert_eq!(stock(&module, books[1].id()).await, BookStock::new(1));
    }
}
