pub mod conversation;
pub mod health;
pub mod payment;
pub mod product;
pub mod user;
pub mod v1;
