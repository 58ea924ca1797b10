pub mod catalog;
pub mod members;
pub mod orders;
pub mod reports;
