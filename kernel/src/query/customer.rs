use serde::Deserialize;
use time::OffsetDateTime;

use crate::entity::{Address, Customer, CustomerId};
use crate::query::{any_of, within, Criteria};

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct AddressCriteria {
    pub streets: Vec<String>,
    pub cities: Vec<String>,
    pub states: Vec<String>,
    pub postal_codes: Vec<String>,
    pub countries: Vec<String>,
}

impl Criteria<Address> for AddressCriteria {
    fn matches(&self, address: &Address) -> bool {
        any_of(&self.streets, address.street())
            && any_of(&self.cities, address.city())
            && any_of(&self.states, address.state())
            && any_of(&self.postal_codes, address.postal_code())
            && any_of(&self.countries, address.country())
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct CustomerCriteria {
    pub ids: Vec<CustomerId>,
    pub names: Vec<String>,
    pub emails: Vec<String>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub min_created_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub max_created_at: Option<OffsetDateTime>,
    pub address: AddressCriteria,
}

impl Criteria<Customer> for CustomerCriteria {
    fn matches(&self, customer: &Customer) -> bool {
        any_of(&self.ids, customer.id())
            && any_of(&self.names, customer.name().as_ref())
            && (self.emails.is_empty()
                || self
                    .emails
                    .iter()
                    .any(|email| customer.email().matches(email)))
            && within(
                self.min_created_at.as_ref(),
                self.max_created_at.as_ref(),
                customer.created_at().as_ref(),
            )
            && self.address.matches(customer.address())
    }
}
