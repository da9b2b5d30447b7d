pub mod cache;
pub mod catalog;
pub mod catchers;
pub mod config;
pub mod cors;
pub mod credentials;
pub mod error;
pub mod facebook;
pub mod force;
pub mod ledger;
pub mod routes;
pub mod session;
pub mod tally;

pub use shared::models::*;
