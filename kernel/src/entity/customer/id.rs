use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use vodca::{AsRefln, Fromln};

use crate::entity::EntityId;

#[derive(
    Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize, Fromln,
    AsRefln,
)]
#[serde(transparent)]
pub struct CustomerId(i32);

impl CustomerId {
    pub fn new(id: impl Into<i32>) -> Self {
        Self(id.into())
    }
}

impl EntityId for CustomerId {
    fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    fn raw(&self) -> i32 {
        self.0
    }
}

impl Display for CustomerId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "customer#{}", self.0)
    }
}
