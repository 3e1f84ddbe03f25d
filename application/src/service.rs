pub use self::{author::*, book::*, customer::*, integrity::*, order::*, report::*, review::*};

mod author;
mod book;
mod customer;
mod integrity;
mod order;
mod report;
mod review;
