use std::fmt::{Display, Formatter};

use error_stack::Report;
use serde::{Deserialize, Serialize};

use crate::KernelError;

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomerRole {
    Admin,
    #[default]
    User,
}

impl CustomerRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            CustomerRole::Admin => "admin",
            CustomerRole::User => "user",
        }
    }
}

impl Display for CustomerRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for CustomerRole {
    type Error = Report<KernelError>;
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "admin" => Ok(CustomerRole::Admin),
            "user" => Ok(CustomerRole::User),
            other => Err(Report::new(KernelError::Validation)
                .attach_printable(format!("Unknown customer role: {other}"))),
        }
    }
}
