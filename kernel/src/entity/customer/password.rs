use std::fmt::{Debug, Formatter};

use vodca::{AsRefln, Fromln};

/// Stored password hash. Never serialized and masked in debug output.
#[derive(Clone, Eq, PartialEq, Fromln, AsRefln)]
pub struct CustomerPassword(String);

impl CustomerPassword {
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }
}

impl Debug for CustomerPassword {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("CustomerPassword(...)")
    }
}
