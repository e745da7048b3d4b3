pub mod auth;
pub mod booking;
pub mod id;
pub mod list;
pub mod product;
pub mod role;
pub mod user;
