pub use self::{author::*, book::*, customer::*, order::*, report::*, review::*};

mod author;
mod book;
mod customer;
mod order;
mod report;
mod review;
