pub mod conversation;
pub mod payment;
pub mod product;
pub mod user;
