pub mod utils;

pub use utils::test_client;
pub use utils::test_db;

mod auth;
mod beck;
mod config;
mod gamification;
mod protocol;
mod sessions;
mod strategies;
