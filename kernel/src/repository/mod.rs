pub mod catalog;
pub mod health;
pub mod inventory;
pub mod ledger;
pub mod payment;
pub mod referral;
pub mod seed;
pub mod session;
pub mod user;
