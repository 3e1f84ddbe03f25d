use destructure::Destructure;
use serde::{Deserialize, Serialize};
use vodca::References;

#[derive(
    Debug, Clone, Default, Eq, PartialEq, Hash, Serialize, Deserialize, References, Destructure,
)]
pub struct Address {
    street: String,
    city: String,
    state: String,
    postal_code: String,
    country: String,
}

impl Address {
    pub fn new(
        street: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
        postal_code: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            street: street.into(),
            city: city.into(),
            state: state.into(),
            postal_code: postal_code.into(),
            country: country.into(),
        }
    }
}
