pub mod api;
pub mod catalog;
pub mod member;
pub mod order;
pub mod report;
