use crate::controller::Intake;
use application::transfer::{CreateBookDto, UpdateBookDto};
use kernel::prelude::entity::{AuthorId, BookId};
use rust_decimal::Decimal;
use serde::Deserialize;
use time::OffsetDateTime;

#[derive(Debug, Deserialize)]
pub struct CreateRequest {
    title: String,
    author_id: i32,
    #[serde(default)]
    genres: Vec<String>,
    #[serde(with = "time::serde::rfc3339")]
    published_at: OffsetDateTime,
    price: Decimal,
    stock: i32,
}

// Full replacement; every field is required.
#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    title: String,
    author_id: i32,
    #[serde(default)]
    genres: Vec<String>,
    #[serde(with = "time::serde::rfc3339")]
    published_at: OffsetDateTime,
    price: Decimal,
    stock: i32,
}

pub struct Transformer;

impl Intake<CreateRequest> for Transformer {
    type To = CreateBookDto;
    fn emit(&self, input: CreateRequest) -> Self::To {
        CreateBookDto {
            title: input.title,
            author_id: AuthorId::new(input.author_id),
            genres: input.genres,
            published_at: input.published_at,
            price: input.price,
            stock: input.stock,
        }
    }
}

impl Intake<(i32, UpdateRequest)> for Transformer {
    type To = UpdateBookDto;
    fn emit(&self, input: (i32, UpdateRequest)) -> Self::To {
        let (id, input) = input;
        UpdateBookDto {
            id: BookId::new(id),
            title: input.title,
            author_id: AuthorId::new(input.author_id),
            genres: input.genres,
            published_at: input.published_at,
            price: input.price,
            stock: input.stock,
        }
    }
}
