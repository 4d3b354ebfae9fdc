pub mod id;
pub mod key;
pub mod list;
pub mod payment;
pub mod product;
pub mod referral;
pub mod role;
pub mod session;
pub mod user;
