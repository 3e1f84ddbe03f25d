use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use error_stack::Report;

use kernel::interface::query::CustomerCriteria;
use kernel::prelude::entity::{
    CreatedAt, Customer, CustomerEmail, CustomerId, CustomerName, CustomerPassword,
    CustomerUsername,
};
use kernel::KernelError;

use crate::service::IntegrityGuard;
use crate::store::DependOnCustomerStore;
use crate::transfer::{CreateCustomerDto, UpdateCustomerDto, VerifyCustomerDto};

#[async_trait::async_trait]
pub trait GetCustomerService: 'static + Sync + Send + DependOnCustomerStore {
    async fn get_customer(&self, id: &CustomerId) -> error_stack::Result<Customer, KernelError> {
        self.customer_store().get(id).await
    }

    async fn get_all_customers(&self) -> error_stack::Result<Vec<Customer>, KernelError> {
        self.customer_store().list().await
    }

    async fn search_customers(
        &self,
        criteria: &CustomerCriteria,
    ) -> error_stack::Result<Vec<Customer>, KernelError> {
        self.customer_store().search(criteria).await
    }

    /// Looks a customer up by email and checks the password against the
    /// stored hash. Both an unknown email and a wrong password yield `None`.
    async fn verify_customer(
        &self,
        dto: VerifyCustomerDto,
    ) -> error_stack::Result<Option<Customer>, KernelError> {
        let criteria = CustomerCriteria {
            emails: vec![dto.email],
            ..Default::default()
        };
        let found = self.customer_store().search(&criteria).await?;
        Ok(found
            .into_iter()
            .find(|customer| verify_password(&dto.password, customer.password())))
    }
}

impl<T> GetCustomerService for T where T: DependOnCustomerStore {}

#[async_trait::async_trait]
pub trait CreateCustomerService: 'static + Sync + Send + DependOnCustomerStore {
    async fn create_customer(
        &self,
        dto: CreateCustomerDto,
    ) -> error_stack::Result<Customer, KernelError> {
        ensure_email_free(self, &dto.email, None).await?;
        let customer = Customer::new(
            CustomerId::new(0),
            CustomerName::new(dto.name),
            CustomerUsername::new(dto.username),
            CustomerEmail::new(dto.email),
            hash_password(&dto.password)?,
            dto.address,
            dto.role,
            CreatedAt::now(),
        );
        self.customer_store().create(&customer).await
    }
}

impl<T> CreateCustomerService for T where T: DependOnCustomerStore {}

#[async_trait::async_trait]
pub trait UpdateCustomerService: 'static + Sync + Send + DependOnCustomerStore {
    async fn update_customer(
        &self,
        dto: UpdateCustomerDto,
    ) -> error_stack::Result<Customer, KernelError> {
        let UpdateCustomerDto {
            id,
            name,
            username,
            email,
            password,
            address,
            role,
        } = dto;
        let existing = self.customer_store().get(&id).await?;
        ensure_email_free(self, &email, Some(&id)).await?;
        let password = match password {
            Some(plain) => hash_password(&plain)?,
            None => existing.password().clone(),
        };
        let customer = Customer::new(
            id,
            CustomerName::new(name),
            CustomerUsername::new(username),
            CustomerEmail::new(email),
            password,
            address,
            role,
            *existing.created_at(),
        );
        self.customer_store().update(&id, &customer).await
    }
}

impl<T> UpdateCustomerService for T where T: DependOnCustomerStore {}

#[async_trait::async_trait]
pub trait DeleteCustomerService:
    'static + Sync + Send + DependOnCustomerStore + IntegrityGuard
{
    async fn delete_customer(&self, id: &CustomerId) -> error_stack::Result<(), KernelError> {
        self.ensure_customer_unreferenced(id).await?;
        self.customer_store().delete(id).await
    }
}

impl<T> DeleteCustomerService for T where T: DependOnCustomerStore + IntegrityGuard {}

async fn ensure_email_free<T: DependOnCustomerStore + ?Sized>(
    module: &T,
    email: &str,
    owner: Option<&CustomerId>,
) -> error_stack::Result<(), KernelError> {
    let criteria = CustomerCriteria {
        emails: vec![email.to_string()],
        ..Default::default()
    };
    let taken = module
        .customer_store()
        .search(&criteria)
        .await?
        .into_iter()
        .any(|customer| Some(customer.id()) != owner);
    if taken {
        return Err(Report::new(KernelError::Conflict)
            .attach_printable(format!("email {email} is already registered")));
    }
    Ok(())
}

fn hash_password(password: &str) -> error_stack::Result<CustomerPassword, KernelError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| {
            Report::new(KernelError::Internal)
                .attach_printable(format!("password hashing failed: {e}"))
        })?;
    Ok(CustomerPassword::new(hash.to_string()))
}

fn verify_password(password: &str, hash: &CustomerPassword) -> bool {
    let Ok(parsed) = PasswordHash::new(hash.as_ref().as_str()) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod test {
    use kernel::prelude::entity::{Address, CustomerRole, ItemQuantity};
    use kernel::KernelError;

    use crate::fixture::{book, TestModule};
    use crate::service::{
        CreateCustomerService, CreateOrderService, DeleteCustomerService, GetCustomerService,
        UpdateCustomerService,
    };
    use crate::store::DependOnBookStore;
    use crate::transfer::{
        CreateCustomerDto, CreateOrderDto, RequestedItem, UpdateCustomerDto, VerifyCustomerDto,
    };

    fn dto(email: &str) -> CreateCustomerDto {
        CreateCustomerDto {
            name: "Shevek".to_string(),
            username: "shevek".to_string(),
            email: email.to_string(),
            password: "anarres".to_string(),
            address: Address::default(),
            role: CustomerRole::User,
        }
    }

    fn verify(email: &str, password: &str) -> VerifyCustomerDto {
        VerifyCustomerDto {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn stores_hash_and_verifies() {
        let module = TestModule::new();
        let created = module.create_customer(dto("shevek@example.com")).await.unwrap();
        assert_ne!(created.password().as_ref(), "anarres");

        let found = module
            .verify_customer(verify("SHEVEK@example.com", "anarres"))
            .await
            .unwrap();
        assert_eq!(found.map(|c| *c.id()), Some(*created.id()));
        assert!(module
            .verify_customer(verify("shevek@example.com", "urras"))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn email_is_unique() {
        let module = TestModule::new();
        let first = module.create_customer(dto("shevek@example.com")).await.unwrap();
        let second = module.create_customer(dto("takver@example.com")).await.unwrap();

        let duplicate = module.create_customer(dto("Shevek@example.com")).await;
        assert!(matches!(
            duplicate.map_err(|e| *e.current_context()),
            Err(KernelError::Conflict)
        ));

        let steal = module
            .update_customer(UpdateCustomerDto {
                id: *second.id(),
                name: "Takver".to_string(),
                username: "takver".to_string(),
                email: "shevek@example.com".to_string(),
                password: None,
                address: Address::default(),
                role: CustomerRole::User,
            })
            .await;
        assert!(matches!(
            steal.map_err(|e| *e.current_context()),
            Err(KernelError::Conflict)
        ));

        // Keeping one's own email is fine.
        let kept = module
            .update_customer(UpdateCustomerDto {
                id: *first.id(),
                name: "Shevek".to_string(),
                username: "physicist".to_string(),
                email: "shevek@example.com".to_string(),
                password: None,
                address: Address::default(),
                role: CustomerRole::Admin,
            })
            .await
            .unwrap();
        assert_eq!(kept.password(), first.password());
        assert_eq!(kept.created_at(), first.created_at());
    }

    #[tokio::test]
    async fn malformed_email_is_rejected() {
        let module = TestModule::new();
        let result = module.create_customer(dto("shevek")).await;
        assert!(matches!(
            result.map_err(|e| *e.current_context()),
            Err(KernelError::Validation)
        ));
    }

    #[tokio::test]
    async fn customer_with_orders_is_kept() {
        let module = TestModule::new();
        let created = module.create_customer(dto("shevek@example.com")).await.unwrap();
        let stocked = module.book_store().create(&book(1, 2)).await.unwrap();
        module
            .create_order(CreateOrderDto {
                customer_id: *created.id(),
                items: vec![RequestedItem {
                    book_id: *stocked.id(),
                    quantity: ItemQuantity::new(1),
                }],
                status: None,
            })
            .await
            .unwrap();

        let result = module.delete_customer(created.id()).await;
        assert!(matches!(
            result.map_err(|e| *e.current_context()),
            Err(KernelError::Conflict)
        ));
        assert!(module.get_customer(created.id()).await.is_ok());
    }

    #[tokio::test]
    async fn customer_without_orders_is_deleted() {
        let module = TestModule::new();
        let created = module.create_customer(dto("shevek@example.com")).await.unwrap();
        module.delete_customer(created.id()).await.unwrap();
        assert!(module.get_all_customers().await.unwrap().is_empty());
    }
}
