use crate::controller::Exhaust;
use application::transfer::AuthorRemoval;
use axum::response::IntoResponse;
use axum::Json;
use kernel::prelude::entity::{
    Author, AuthorBiography, AuthorFirstName, AuthorId, AuthorLastName, BookId, DestructAuthor,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct AuthorResponse {
    id: AuthorId,
    first_name: AuthorFirstName,
    last_name: AuthorLastName,
    bio: AuthorBiography,
}

impl IntoResponse for AuthorResponse {
    fn into_response(self) -> axum::response::Response {
        (axum::http::StatusCode::OK, Json(self)).into_response()
    }
}

impl From<Author> for AuthorResponse {
    fn from(author: Author) -> Self {
        let DestructAuthor {
            id,
            first_name,
            last_name,
            bio,
        } = author.into_destruct();
        Self {
            id,
            first_name,
            last_name,
            bio,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RemovalResponse {
    removed_books: Vec<BookId>,
    retained_books: Vec<BookId>,
}

pub struct Presenter;

impl Exhaust<Author> for Presenter {
    type To = AuthorResponse;
    fn emit(&self, input: Author) -> Self::To {
        AuthorResponse::from(input)
    }
}

impl Exhaust<Vec<Author>> for Presenter {
    type To = Json<Vec<AuthorResponse>>;
    fn emit(&self, input: Vec<Author>) -> Self::To {
        Json(input.into_iter().map(AuthorResponse::from).collect())
    }
}

impl Exhaust<AuthorRemoval> for Presenter {
    type To = Json<RemovalResponse>;
    fn emit(&self, input: AuthorRemoval) -> Self::To {
        Json(RemovalResponse {
            removed_books: input.removed,
            retained_books: input.retained,
        })
    }
}
