use kernel::prelude::entity::{AuthorId, BookId};

#[derive(Debug, Clone)]
pub struct CreateAuthorDto {
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
}

#[derive(Debug, Clone)]
pub struct UpdateAuthorDto {
    pub id: AuthorId,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
}

/// Outcome of an author deletion: unordered books go with the author,
/// ordered ones stay.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct AuthorRemoval {
    pub removed: Vec<BookId>,
    pub retained: Vec<BookId>,
}
