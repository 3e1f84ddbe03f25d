pub mod schedule;
pub mod service;
pub mod store;
pub mod transfer;

#[cfg(test)]
pub(crate) mod fixture;
