pub mod key;
pub mod payment;
pub mod product;
pub mod session;
pub mod user;
