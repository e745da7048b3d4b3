pub mod booking;
pub mod health;
pub mod product;
pub mod user;
