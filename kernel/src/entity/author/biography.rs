use serde::{Deserialize, Serialize};
use vodca::{AsRefln, Fromln};

#[derive(Debug, Clone, Default, Eq, PartialEq, Hash, Serialize, Deserialize, Fromln, AsRefln)]
#[serde(transparent)]
pub struct AuthorBiography(String);

impl AuthorBiography {
    pub fn new(bio: impl Into<String>) -> Self {
        Self(bio.into())
    }
}
