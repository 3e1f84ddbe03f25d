use crate::controller::Exhaust;
use axum::response::IntoResponse;
use axum::Json;
use kernel::prelude::entity::{
    AuthorId, Book, BookGenres, BookId, BookPrice, BookReviewAggregate, BookStock, BookTitle,
    CreatedAt, DestructBook, PublishedAt,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct BookResponse {
    id: BookId,
    title: BookTitle,
    author_id: AuthorId,
    genres: BookGenres,
    published_at: PublishedAt,
    price: BookPrice,
    stock: BookStock,
    created_at: CreatedAt,
    review: Option<BookReviewAggregate>,
}

impl IntoResponse for BookResponse {
    fn into_response(self) -> axum::response::Response {
        (axum::http::StatusCode::OK, Json(self)).into_response()
    }
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        let DestructBook {
            id,
            title,
            author_id,
            genres,
            published_at,
            price,
            stock,
            created_at,
            review_stats,
        } = book.into_destruct();
        Self {
            id,
            title,
            author_id,
            genres,
            published_at,
            price,
            stock,
            created_at,
            review: review_stats,
        }
    }
}

pub struct Presenter;

impl Exhaust<Book> for Presenter {
    type To = BookResponse;
    fn emit(&self, input: Book) -> Self::To {
        BookResponse::from(input)
    }
}

impl Exhaust<Vec<Book>> for Presenter {
    type To = Json<Vec<BookResponse>>;
    fn emit(&self, input: Vec<Book>) -> Self::To {
        Json(input.into_iter().map(BookResponse::from).collect())
    }
}

impl Exhaust<()> for Presenter {
    type To = axum::http::StatusCode;
    fn emit(&self, _: ()) -> Self::To {
        axum::http::StatusCode::NO_CONTENT
    }
}
