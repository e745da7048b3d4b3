pub mod booking;
mod money;
pub mod product;
pub mod user;
