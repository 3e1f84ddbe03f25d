pub use self::{
    author::AuthorRouter, book::BookRouter, customer::CustomerRouter, order::OrderRouter,
    report::ReportRouter, review::ReviewRouter,
};

mod author;
mod book;
mod customer;
mod order;
mod report;
mod review;
