use serde::Deserialize;

use crate::entity::{Author, AuthorId};
use crate::query::{any_of, Criteria};

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct AuthorCriteria {
    pub ids: Vec<AuthorId>,
    pub first_names: Vec<String>,
    pub last_names: Vec<String>,
}

impl Criteria<Author> for AuthorCriteria {
    fn matches(&self, author: &Author) -> bool {
        any_of(&self.ids, author.id())
            && any_of(&self.first_names, author.first_name().as_ref())
            && any_of(&self.last_names, author.last_name().as_ref())
    }
}
