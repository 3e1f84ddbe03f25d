use serde::{Deserialize, Serialize};
use vodca::{AsRefln, Fromln};

#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, Fromln, AsRefln)]
#[serde(transparent)]
pub struct CustomerEmail(String);

impl CustomerEmail {
    pub fn new(email: impl Into<String>) -> Self {
        Self(email.into())
    }

    pub fn is_well_formed(&self) -> bool {
        match self.0.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty() && domain.contains('.') && !domain.contains('@')
            }
            None => false,
        }
    }

    pub fn matches(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}

#[cfg(test)]
mod test {
    use crate::entity::CustomerEmail;

    #[test]
    fn well_formed() {
        assert!(CustomerEmail::new("reader@example.com").is_well_formed());
        assert!(!CustomerEmail::new("reader.example.com").is_well_formed());
        assert!(!CustomerEmail::new("@example.com").is_well_formed());
        assert!(!CustomerEmail::new("reader@localhost").is_well_formed());
    }
}
