mod author;
mod book;
mod common;
mod customer;
mod order;
mod report;
mod review;

pub use self::{author::*, book::*, common::*, customer::*, order::*, report::*, review::*};
