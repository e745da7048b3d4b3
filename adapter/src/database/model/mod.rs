pub mod booking;
pub mod product;
pub mod user;
