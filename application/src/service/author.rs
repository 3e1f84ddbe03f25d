use kernel::interface::query::AuthorCriteria;
use kernel::prelude::entity::{Author, AuthorBiography, AuthorFirstName, AuthorId, AuthorLastName};
use kernel::KernelError;

use crate::service::IntegrityGuard;
use crate::store::{DependOnAuthorStore, DependOnBookStore};
use crate::transfer::{AuthorRemoval, CreateAuthorDto, UpdateAuthorDto};

#[async_trait::async_trait]
pub trait GetAuthorService: 'static + Sync + Send + DependOnAuthorStore {
    async fn get_author(&self, id: &AuthorId) -> error_stack::Result<Author, KernelError> {
        self.author_store().get(id).await
    }

    async fn get_all_authors(&self) -> error_stack::Result<Vec<Author>, KernelError> {
        self.author_store().list().await
    }

    async fn search_authors(
        &self,
        criteria: &AuthorCriteria,
    ) -> error_stack::Result<Vec<Author>, KernelError> {
        self.author_store().search(criteria).await
    }
}

impl<T> GetAuthorService for T where T: DependOnAuthorStore {}

#[async_trait::async_trait]
pub trait CreateAuthorService: 'static + Sync + Send + DependOnAuthorStore {
    async fn create_author(
        &self,
        dto: CreateAuthorDto,
    ) -> error_stack::Result<Author, KernelError> {
        let author = Author::new(
            AuthorId::new(0),
            AuthorFirstName::new(dto.first_name),
            AuthorLastName::new(dto.last_name),
            AuthorBiography::new(dto.bio),
        );
        self.author_store().create(&author).await
    }
}

impl<T> CreateAuthorService for T where T: DependOnAuthorStore {}

#[async_trait::async_trait]
pub trait UpdateAuthorService: 'static + Sync + Send + DependOnAuthorStore + IntegrityGuard {
    /// Authors with books are frozen.
    async fn update_author(
        &self,
        dto: UpdateAuthorDto,
    ) -> error_stack::Result<Author, KernelError> {
        self.ensure_author_unreferenced(&dto.id).await?;
        let author = Author::new(
            dto.id,
            AuthorFirstName::new(dto.first_name),
            AuthorLastName::new(dto.last_name),
            AuthorBiography::new(dto.bio),
        );
        self.author_store().update(&dto.id, &author).await
    }
}

impl<T> UpdateAuthorService for T where T: DependOnAuthorStore + IntegrityGuard {}

#[async_trait::async_trait]
pub trait DeleteAuthorService:
    'static + Sync + Send + DependOnAuthorStore + DependOnBookStore + IntegrityGuard
{
    /// Removes the author together with every book of theirs that no order
    /// mentions. Ordered books stay behind, still pointing at the author id.
    async fn delete_author(
        &self,
        id: &AuthorId,
    ) -> error_stack::Result<AuthorRemoval, KernelError> {
        self.author_store().get(id).await?;

        let referenced = self.referenced_books().await?;
        let mut removal = AuthorRemoval::default();
        for book in self.book_store().list().await? {
            if book.author_id() != id {
                continue;
            }
            if referenced.contains(book.id()) {
                removal.retained.push(*book.id());
            } else {
                if let Err(report) = self.book_store().delete(book.id()).await {
                    return Err(report.attach_printable(format!(
                        "{id} deletion aborted after removing {:?}",
                        removal.removed
                    )));
                }
                removal.removed.push(*book.id());
            }
        }
        self.author_store().delete(id).await?;
        tracing::info!(
            author = %id,
            removed = removal.removed.len(),
            retained = removal.retained.len(),
            "author deleted"
        );
        Ok(removal)
    }
}

impl<T> DeleteAuthorService for T where
    T: DependOnAuthorStore + DependOnBookStore + IntegrityGuard
{
}
