use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use vodca::{AsRefln, Fromln};

#[derive(
    Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize, Fromln,
    AsRefln,
)]
#[serde(transparent)]
pub struct PublishedAt(#[serde(with = "time::serde::rfc3339")] OffsetDateTime);

impl PublishedAt {
    pub fn new(time: impl Into<OffsetDateTime>) -> Self {
        Self(time.into())
    }
}
