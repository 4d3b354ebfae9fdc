pub mod database;
pub mod loader;
pub mod repository;
