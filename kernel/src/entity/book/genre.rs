use serde::{Deserialize, Serialize};
use vodca::{AsRefln, Fromln};

#[derive(Debug, Clone, Default, Eq, PartialEq, Hash, Serialize, Deserialize, Fromln, AsRefln)]
#[serde(transparent)]
pub struct BookGenres(Vec<String>);

impl BookGenres {
    pub fn new(genres: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self(genres.into_iter().map(Into::into).collect())
    }

    pub fn contains_any(&self, genres: &[String]) -> bool {
        self.0.iter().any(|genre| genres.contains(genre))
    }
}
