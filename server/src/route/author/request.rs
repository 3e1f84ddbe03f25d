use crate::controller::Intake;
use application::transfer::{CreateAuthorDto, UpdateAuthorDto};
use kernel::prelude::entity::AuthorId;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CreateRequest {
    first_name: String,
    last_name: String,
    #[serde(default)]
    bio: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    first_name: String,
    last_name: String,
    #[serde(default)]
    bio: String,
}

pub struct Transformer;

impl Intake<CreateRequest> for Transformer {
    type To = CreateAuthorDto;
    fn emit(&self, input: CreateRequest) -> Self::To {
        CreateAuthorDto {
            first_name: input.first_name,
            last_name: input.last_name,
            bio: input.bio,
        }
    }
}

impl Intake<(i32, UpdateRequest)> for Transformer {
    type To = UpdateAuthorDto;
    fn emit(&self, input: (i32, UpdateRequest)) -> Self::To {
        let (id, input) = input;
        UpdateAuthorDto {
            id: AuthorId::new(id),
            first_name: input.first_name,
            last_name: input.last_name,
            bio: input.bio,
        }
    }
}
